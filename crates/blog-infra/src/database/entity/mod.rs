//! SeaORM entities for the blog schema.

pub mod comment;
pub mod post;
pub mod post_tag;
pub mod tag;
pub mod user;

use sea_orm::ActiveValue;
use sea_orm::Value;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Current value of an active field, if the caller provided one.
pub(crate) fn active_value<V>(value: &ActiveValue<V>) -> Option<&V>
where
    V: Into<Value>,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v),
        ActiveValue::NotSet => None,
    }
}

/// `created_at` / `updated_at` values for a row being saved: both stamped on
/// insert, only `updated_at` on update.
pub(crate) fn timestamps(
    insert: bool,
) -> (
    ActiveValue<DateTimeWithTimeZone>,
    ActiveValue<DateTimeWithTimeZone>,
) {
    let now: DateTimeWithTimeZone = chrono::Utc::now().into();
    let created = if insert {
        ActiveValue::Set(now)
    } else {
        ActiveValue::NotSet
    };
    (created, ActiveValue::Set(now))
}
