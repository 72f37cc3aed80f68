table! {
    auth_tokens (key) {
        key -> Varchar,
        user_id -> Int4,
        created -> Timestamptz,
    }
}

table! {
    comments (id) {
        id -> Int4,
        comment -> Text,
        entity -> Varchar,
        entity_id -> Int4,
        commenter_id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    comparisons (id) {
        id -> Int4,
        criterion_id -> Int4,
        school1_id -> Int4,
        school2_id -> Int4,
        choice_id -> Int4,
        comparer_id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    criteria (id) {
        id -> Int4,
        description -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    reports (id) {
        id -> Int4,
        content -> Text,
        school_id -> Int4,
        reporter_id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    reviews (id) {
        id -> Int4,
        content -> Text,
        school_id -> Int4,
        reviewer_id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    schools (id) {
        id -> Int4,
        name -> Varchar,
        description -> Text,
        location -> Varchar,
        website -> Varchar,
        rating -> Float8,
        rank -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    upvotes (id) {
        id -> Int4,
        entity -> Varchar,
        entity_id -> Int4,
        upvoter_id -> Int4,
        created_at -> Timestamptz,
    }
}

table! {
    users (id) {
        id -> Int4,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        salt -> Varchar,
        is_active -> Bool,
        date_joined -> Timestamptz,
        last_login -> Nullable<Timestamptz>,
    }
}

joinable!(auth_tokens -> users (user_id));
joinable!(comments -> users (commenter_id));
joinable!(comparisons -> criteria (criterion_id));
joinable!(reports -> schools (school_id));
joinable!(reports -> users (reporter_id));
joinable!(reviews -> schools (school_id));
joinable!(reviews -> users (reviewer_id));
joinable!(upvotes -> users (upvoter_id));

allow_tables_to_appear_in_same_query!(
    auth_tokens,
    comments,
    comparisons,
    criteria,
    reports,
    reviews,
    schools,
    upvotes,
    users,
);
