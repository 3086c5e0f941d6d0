pub mod sync_repo;
pub use sync_repo::SyncRepository;
