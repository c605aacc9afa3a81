pub mod results_sync_job;
