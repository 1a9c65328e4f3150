//! Named-key page envelopes.
//!
//! Most list endpoints nest their Laravel pager under a key named after the
//! resource (`{"bans": {...}, "status": {...}}`). Each wrapper here hands
//! the nested pager to the pagination driver through [`Paged`].

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::common::Status;
use crate::pagination::{PageInfo, Paged, Pager};

/// Declare a wrapper whose pager sits under `$field`, plus its [`Paged`] impl.
macro_rules! keyed_envelope {
    ($(#[$doc:meta])* $name:ident, $field:ident) => {
        $(#[$doc])*
        #[derive(Debug, Deserialize)]
        pub struct $name<T> {
            pub $field: Pager<T>,
            #[serde(default)]
            pub status: Option<Status>,
        }

        impl<T: DeserializeOwned + Send> Paged for $name<T> {
            type Item = T;

            fn next_page_url(&self) -> Option<&str> {
                self.$field.next_page_url()
            }

            fn page_info(&self) -> PageInfo {
                self.$field.page_info()
            }

            fn into_items(self) -> Vec<T> {
                self.$field.into_items()
            }
        }
    };
}

keyed_envelope!(
    /// `{ "bans": pager }`
    BansEnvelope,
    bans
);
keyed_envelope!(
    /// `{ "competitions": pager }`
    CompetitionsEnvelope,
    competitions
);
keyed_envelope!(
    /// `{ "teams": pager }`
    TeamsEnvelope,
    teams
);
keyed_envelope!(
    /// `{ "results": pager }`, used by match listings and competition results.
    ResultsEnvelope,
    results
);
keyed_envelope!(
    /// `{ "matches": pager }`
    MatchesEnvelope,
    matches
);
keyed_envelope!(
    /// `{ "demos": pager }`
    DemosEnvelope,
    demos
);
keyed_envelope!(
    /// `{ "recruitment": pager }`, for both player and team posts.
    RecruitmentEnvelope,
    recruitment
);
