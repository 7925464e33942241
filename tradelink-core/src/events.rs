/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Event listing queries.
//!
//! Markets on the venue are grouped into events. An [`EventQuery`] selects a
//! slice of the event tree; the wire crate serializes it into an
//! events-request payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A query against the venue's event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventQuery {
    /// Political events.
    Politics,
    /// Current affairs events.
    CurrentAffairs,
    /// Television and entertainment events.
    TvAndEntertainment,
    /// Sport events on a specific date.
    SportByDate {
        /// Date the events start on.
        date: NaiveDate,
    },
    /// Sport events without a date grouping.
    SportOther,
}

impl EventQuery {
    /// Returns the wire category tag for this query.
    #[must_use]
    pub const fn category(&self) -> u8 {
        match self {
            Self::Politics => 1,
            Self::CurrentAffairs => 2,
            Self::TvAndEntertainment => 3,
            Self::SportByDate { .. } => 4,
            Self::SportOther => 5,
        }
    }

    /// Returns the date filter, when the query carries one.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::SportByDate { date } => Some(*date),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tags_are_distinct() {
        let queries = [
            EventQuery::Politics,
            EventQuery::CurrentAffairs,
            EventQuery::TvAndEntertainment,
            EventQuery::SportByDate {
                date: NaiveDate::from_ymd_opt(2011, 6, 21).unwrap(),
            },
            EventQuery::SportOther,
        ];
        let mut tags: Vec<u8> = queries.iter().map(EventQuery::category).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), queries.len());
    }

    #[test]
    fn test_date_only_on_dated_queries() {
        let date = NaiveDate::from_ymd_opt(2011, 6, 21).unwrap();
        assert_eq!(EventQuery::SportByDate { date }.date(), Some(date));
        assert_eq!(EventQuery::Politics.date(), None);
    }
}
