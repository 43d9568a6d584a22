use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::Post;
use super::slug::is_valid_slug;
use crate::error::DomainError;

/// The `/{year}/{month}/{day}/{slug}/` address of a post.
///
/// Always holds a real calendar date and a valid slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permalink {
    date: NaiveDate,
    slug: String,
}

impl Permalink {
    pub fn new(year: i32, month: u32, day: u32, slug: impl Into<String>) -> Result<Self, DomainError> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            DomainError::Validation(format!("{year}-{month}-{day} is not a calendar date"))
        })?;
        let slug = slug.into();
        if !is_valid_slug(&slug) {
            return Err(DomainError::Validation(format!("'{slug}' is not a valid slug")));
        }
        Ok(Self { date, slug })
    }

    /// Built from the UTC date of the post's publish timestamp.
    pub fn for_post(post: &Post) -> Self {
        Self {
            date: post.publish.date_naive(),
            slug: post.slug.clone(),
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Half-open `[start, end)` range of publish timestamps on this day.
    pub fn publish_range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        day_range(self.date)
    }

    pub fn path(&self) -> String {
        self.to_string()
    }
}

/// Half-open UTC range covering one calendar day.
pub fn day_range(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

impl fmt::Display for Permalink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{}/{}/{}/{}/",
            self.year(),
            self.month(),
            self.day(),
            self.slug
        )
    }
}

impl FromStr for Permalink {
    type Err = DomainError;

    /// Accepts the path with or without the leading and trailing slash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::Validation(format!("'{s}' is not a post permalink"));

        let parts: Vec<&str> = s.trim_matches('/').split('/').collect();
        let [year, month, day, slug] = parts.as_slice() else {
            return Err(invalid());
        };

        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        let day = day.parse().map_err(|_| invalid())?;
        Permalink::new(year, month, day, *slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_has_no_zero_padding() {
        let link = Permalink::new(2023, 5, 1, "hello-world").unwrap();
        assert_eq!(link.path(), "/2023/5/1/hello-world/");
        assert_eq!(link.to_string(), link.path());
    }

    #[test]
    fn test_rejects_impossible_dates_and_slugs() {
        assert!(Permalink::new(2023, 2, 30, "x").is_err());
        assert!(Permalink::new(2023, 13, 1, "x").is_err());
        assert!(Permalink::new(2023, 5, 1, "no spaces").is_err());
    }

    #[test]
    fn test_parse_path() {
        let link: Permalink = "/2023/5/1/hello-world/".parse().unwrap();
        assert_eq!(link, Permalink::new(2023, 5, 1, "hello-world").unwrap());

        let padded: Permalink = "2023/05/01/hello-world".parse().unwrap();
        assert_eq!(padded, link);

        assert!("/2023/5/hello-world/".parse::<Permalink>().is_err());
        assert!("/twenty/5/1/hello-world/".parse::<Permalink>().is_err());
    }

    #[test]
    fn test_publish_range_covers_one_day() {
        let link = Permalink::new(2023, 12, 31, "last").unwrap();
        let (start, end) = link.publish_range();
        assert_eq!(start.to_rfc3339(), "2023-12-31T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }
}
