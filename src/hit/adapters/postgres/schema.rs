//! Diesel schema for HIT synchronization persistence.

diesel::table! {
    /// Local mirrors of marketplace HITs.
    hits (id) {
        /// Local HIT identifier.
        id -> Uuid,
        /// Marketplace HIT identifier, set once published.
        #[max_length = 255]
        remote_id -> Nullable<Varchar>,
        /// Marketplace HIT type identifier.
        #[max_length = 255]
        hit_type_id -> Nullable<Varchar>,
        /// Marketplace creation time.
        creation_time -> Nullable<Timestamptz>,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Description.
        description -> Text,
        /// Comma-separated keywords.
        keywords -> Text,
        /// Reward per assignment.
        reward -> Numeric,
        /// Lifetime in seconds.
        lifetime_in_seconds -> Nullable<Int4>,
        /// Assignment duration in seconds.
        assignment_duration_in_seconds -> Nullable<Int4>,
        /// Maximum assignments.
        max_assignments -> Int4,
        /// Auto-approval delay in seconds.
        auto_approval_delay_in_seconds -> Nullable<Int4>,
        /// Requester annotation.
        requester_annotation -> Nullable<Text>,
        /// Number of similar HITs.
        number_of_similar_hits -> Nullable<Int4>,
        /// Lifecycle status code.
        #[max_length = 1]
        status -> Nullable<Varchar>,
        /// Review status code.
        #[max_length = 1]
        review_status -> Nullable<Varchar>,
        /// Pending assignment count.
        assignments_pending -> Nullable<Int4>,
        /// Available assignment count.
        assignments_available -> Nullable<Int4>,
        /// Completed assignment count.
        assignments_completed -> Nullable<Int4>,
        /// Last marketplace sync.
        last_synced_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Marketplace workers seen on assignments.
    workers (id) {
        /// Marketplace worker identifier.
        #[max_length = 255]
        id -> Varchar,
        /// First time the worker was referenced.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Local mirrors of marketplace assignments.
    assignments (id) {
        /// Marketplace assignment identifier.
        #[max_length = 255]
        id -> Varchar,
        /// Owning HIT.
        hit_id -> Uuid,
        /// Worker, once known.
        #[max_length = 255]
        worker_id -> Nullable<Varchar>,
        /// Status code.
        #[max_length = 1]
        status -> Nullable<Varchar>,
        /// Accept time.
        accepted_at -> Nullable<Timestamptz>,
        /// Submit time.
        submitted_at -> Nullable<Timestamptz>,
        /// Auto-approval time.
        auto_approval_at -> Nullable<Timestamptz>,
        /// Approval time.
        approved_at -> Nullable<Timestamptz>,
        /// Rejection time.
        rejected_at -> Nullable<Timestamptz>,
        /// Deadline.
        deadline -> Nullable<Timestamptz>,
        /// Requester feedback.
        requester_feedback -> Nullable<Text>,
        /// Local completion flag.
        completed -> Bool,
        /// Last marketplace sync.
        last_synced_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Submitted answer fields keyed per assignment.
    key_values (id) {
        /// Answer identifier.
        id -> Uuid,
        /// Owning assignment.
        #[max_length = 255]
        assignment_id -> Varchar,
        /// Answer key.
        #[max_length = 255]
        key -> Varchar,
        /// Answer value.
        value -> Nullable<Text>,
    }
}

diesel::table! {
    /// Completion results recorded by the experiment runner.
    results (id) {
        /// Result identifier.
        id -> Uuid,
        /// Worker.
        #[max_length = 255]
        worker_id -> Varchar,
        /// Template.
        #[max_length = 255]
        template_id -> Varchar,
        /// Battery.
        #[max_length = 255]
        battery_id -> Varchar,
        /// Assignment.
        #[max_length = 255]
        assignment_id -> Varchar,
        /// Free-form task data.
        task_data -> Nullable<Jsonb>,
        /// Browser-reported date-time.
        #[max_length = 255]
        datetime -> Nullable<Varchar>,
        /// Current trial number.
        current_trial -> Nullable<Int4>,
        /// Browser language.
        #[max_length = 255]
        language -> Nullable<Varchar>,
        /// Browser name.
        #[max_length = 255]
        browser -> Nullable<Varchar>,
        /// Platform.
        #[max_length = 255]
        platform -> Nullable<Varchar>,
        /// Completion flag.
        completed -> Bool,
        /// Credit flag.
        credit_granted -> Bool,
    }
}

diesel::joinable!(assignments -> hits (hit_id));
diesel::joinable!(assignments -> workers (worker_id));
diesel::joinable!(key_values -> assignments (assignment_id));
diesel::joinable!(results -> assignments (assignment_id));

diesel::allow_tables_to_appear_in_same_query!(assignments, hits, key_values, results, workers);
