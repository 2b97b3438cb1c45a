//! Test suites for the job-type router.
