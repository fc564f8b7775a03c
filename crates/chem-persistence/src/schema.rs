//! Esquema Diesel (escrito a mano, equivalente a `diesel print-schema`).
//! Las vistas `search_statistics` y `recent_searches` se consultan con
//! `sql_query` y no se declaran aquí.

diesel::table! {
    substances (id) {
        id -> Uuid,
        substance_name -> Text,
        search_term -> Text,
        dcb_name -> Text,
        cas_number -> Nullable<Text>,
        products -> Jsonb,
        references_list -> Jsonb,
        response_source -> Text,
        processing_time_ms -> BigInt,
        content_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    search_history (id) {
        id -> Uuid,
        substance_name -> Text,
        search_term -> Text,
        user_ip -> Text,
        user_agent -> Text,
        response_source -> Text,
        was_cached -> Bool,
        processing_time_ms -> BigInt,
        search_timestamp -> Timestamptz,
    }
}

diesel::table! {
    system_logs (id) {
        id -> BigInt,
        level -> Text,
        component -> Text,
        action -> Text,
        message -> Text,
        metadata -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    report_cache (cache_key) {
        cache_key -> Text,
        payload -> Jsonb,
        response_source -> Text,
        inserted_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    substances,
    search_history,
    system_logs,
    report_cache,
);
