//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Residential buildings.
    hostels (id) {
        id -> Uuid,
        name -> Text,
        warden_id -> Nullable<Uuid>,
        capacity -> Int4,
    }
}

diesel::table! {
    /// Accounts with their password digests.
    users (id) {
        id -> Uuid,
        username -> Text,
        display_name -> Text,
        role -> Text,
        hostel_id -> Nullable<Uuid>,
        room_number -> Nullable<Text>,
        password_digest -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled events; a null `hostel_id` marks a general event.
    events (id) {
        id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        start_date -> Timestamptz,
        end_date -> Timestamptz,
        location -> Nullable<Text>,
        event_type -> Text,
        hostel_id -> Nullable<Uuid>,
        created_by -> Uuid,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Maintenance and welfare complaints.
    complaints (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        category -> Text,
        priority -> Text,
        status -> Text,
        hostel_id -> Uuid,
        room_number -> Nullable<Text>,
        created_by -> Uuid,
        assigned_to -> Nullable<Uuid>,
        resolution -> Nullable<Text>,
        resolved_at -> Nullable<Timestamptz>,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student leave requests.
    leave_requests (id) {
        id -> Uuid,
        student_id -> Uuid,
        hostel_id -> Nullable<Uuid>,
        leave_type -> Text,
        reason -> Text,
        start_date -> Timestamptz,
        end_date -> Timestamptz,
        destination -> Nullable<Text>,
        status -> Text,
        approved_by -> Nullable<Uuid>,
        remarks -> Nullable<Text>,
        decided_at -> Nullable<Timestamptz>,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Direct and broadcast notifications.
    notifications (id) {
        id -> Uuid,
        user_id -> Nullable<Uuid>,
        hostel_id -> Nullable<Uuid>,
        title -> Text,
        message -> Text,
        category -> Text,
        created_by -> Uuid,
        read_by -> Array<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Menus, unique per hostel, date and meal.
    mess_menus (id) {
        id -> Uuid,
        hostel_id -> Nullable<Uuid>,
        date -> Date,
        meal -> Text,
        items -> Array<Text>,
        created_by -> Uuid,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Attendance marks, unique per student, date and meal.
    mess_attendance (id) {
        id -> Uuid,
        student_id -> Uuid,
        hostel_id -> Nullable<Uuid>,
        date -> Date,
        meal -> Text,
        present -> Bool,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student ratings of the mess.
    mess_feedback (id) {
        id -> Uuid,
        student_id -> Uuid,
        hostel_id -> Nullable<Uuid>,
        date -> Date,
        meal -> Nullable<Text>,
        rating -> Int2,
        comment -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user settings with optimistic concurrency.
    user_preferences (user_id) {
        user_id -> Uuid,
        email_notifications -> Bool,
        sms_notifications -> Bool,
        push_notifications -> Bool,
        theme -> Text,
        language -> Text,
        revision -> Int4,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Stored snapshots and their metadata.
    backups (id) {
        id -> Uuid,
        label -> Text,
        created_by -> Uuid,
        created_at -> Timestamptz,
        size_bytes -> Int8,
        checksum -> Text,
        record_count -> Int8,
        payload -> Bytea,
    }
}

diesel::joinable!(user_preferences -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    backups,
    complaints,
    events,
    hostels,
    leave_requests,
    mess_attendance,
    mess_feedback,
    mess_menus,
    notifications,
    user_preferences,
    users,
);
