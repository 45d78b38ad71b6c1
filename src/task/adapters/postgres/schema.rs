//! Diesel schema for task persistence.

diesel::table! {
    /// Pipeline task records.
    tasks (id) {
        /// Store-assigned task identifier.
        id -> Int8,
        /// Original request text.
        user_input -> Text,
        /// Best-effort document text.
        extracted_document_text -> Nullable<Text>,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Planner output.
        planning_result -> Nullable<Text>,
        /// Latest Executor output.
        execution_result -> Nullable<Text>,
        /// Latest Reviewer output.
        review_result -> Nullable<Text>,
        /// Finalizer summary.
        final_result -> Nullable<Text>,
        /// Reusable template.
        template -> Nullable<Text>,
        /// Review rounds counter.
        retry_count -> Int4,
        /// Whether the result was produced without a passing review.
        provisional -> Bool,
        /// Failure explanation.
        fail_reason -> Nullable<Text>,
        /// Stage that failed.
        #[max_length = 20]
        fail_step -> Nullable<Varchar>,
        /// Planner duration in milliseconds.
        planning_duration_ms -> Int8,
        /// Accumulated Executor duration in milliseconds.
        execution_duration_ms -> Int8,
        /// Accumulated Reviewer duration in milliseconds.
        review_duration_ms -> Int8,
        /// Finalizer duration in milliseconds.
        finalizing_duration_ms -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
