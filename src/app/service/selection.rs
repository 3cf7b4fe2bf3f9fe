//! Heuristics for picking the year and article to open first

use chrono::NaiveDate;

use crate::app::models::Article;

/// The article dated `today`, else the first dated article
///
/// `articles` is expected in presentation order, so the first dated article
/// is the newest one. Only the calendar date is compared.
pub fn find_article_for_date(articles: &[Article], today: NaiveDate) -> Option<&Article> {
    articles
        .iter()
        .find(|article| article.date == Some(today))
        .or_else(|| articles.iter().find(|article| article.date.is_some()))
}

/// Newest year among `years`
///
/// Entries are read by their leading digits; the largest such number wins.
/// When no entry starts with a digit the lexicographically last entry is
/// returned. `None` only for an empty slice.
pub fn latest_year(years: &[String]) -> Option<String> {
    years
        .iter()
        .filter_map(|year| leading_number(year))
        .max()
        .map(|year| year.to_string())
        .or_else(|| years.iter().max().cloned())
}

fn leading_number(value: &str) -> Option<u64> {
    let value = value.trim_start();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(name: &str, date: Option<NaiveDate>) -> Article {
        Article {
            name: name.to_string(),
            path: format!("archive/2025/{}", name),
            download_url: format!("https://raw.example.com/{}", name),
            size: 1,
            date,
            sequence_number: None,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_today_wins_over_newer_entries() {
        let articles = vec![
            article("undated.md", None),
            article("2025.9.10.md", Some(ymd(2025, 9, 10))),
            article("2025.9.9.md", Some(ymd(2025, 9, 9))),
        ];
        let found = find_article_for_date(&articles, ymd(2025, 9, 9)).unwrap();
        assert_eq!(found.name, "2025.9.9.md");
    }

    #[test]
    fn test_falls_back_to_first_dated_article() {
        let articles = vec![
            article("notes.md", None),
            article("2025.9.1.md", Some(ymd(2025, 9, 1))),
            article("2025.8.1.md", Some(ymd(2025, 8, 1))),
        ];
        let found = find_article_for_date(&articles, ymd(2025, 9, 9)).unwrap();
        assert_eq!(found.name, "2025.9.1.md");
    }

    #[test]
    fn test_no_dated_article_yields_none() {
        let articles = vec![article("a.md", None), article("b.md", None)];
        assert!(find_article_for_date(&articles, ymd(2025, 9, 9)).is_none());
        assert!(find_article_for_date(&[], ymd(2025, 9, 9)).is_none());
    }

    #[test]
    fn test_latest_year_numeric() {
        assert_eq!(
            latest_year(&strings(&["2021", "2023", "2022"])),
            Some("2023".to_string())
        );
        // Numeric, not lexicographic
        assert_eq!(
            latest_year(&strings(&["999", "1000"])),
            Some("1000".to_string())
        );
    }

    #[test]
    fn test_latest_year_reads_leading_digits() {
        assert_eq!(
            latest_year(&strings(&["2024-archive", "drafts", "2023"])),
            Some("2024".to_string())
        );
    }

    #[test]
    fn test_latest_year_non_numeric_uses_last_name() {
        assert_eq!(
            latest_year(&strings(&["alpha", "gamma", "beta"])),
            Some("gamma".to_string())
        );
    }

    #[test]
    fn test_latest_year_empty() {
        assert_eq!(latest_year(&[]), None);
    }
}
