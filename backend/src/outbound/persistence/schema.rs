//! Diesel table definition for the one table the core owns directly: the
//! upserted, enriched job store.

diesel::table! {
    enriched_jobs (id) {
        id -> Text,
        company -> Text,
        position -> Text,
        location -> Text,
        url -> Text,
        tags -> Array<Text>,
        description -> Text,
        skills -> Array<Text>,
        seniority -> Text,
        summary -> Text,
        embedding -> Array<Float4>,
        created_at -> Timestamptz,
    }
}
