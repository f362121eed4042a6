// update-runner: Supervises the client application and keeps it current.
//
// Architecture:
//   main → UpdateSupervisor::start → periodic scheduler / trigger endpoint
//   UpdateSupervisor::check_for_updates → VersionFeed → ArtifactFetcher
//     → ClientProcess replacement → VersionStore::save

pub mod client_process;
pub mod feed;
pub mod settings;
pub mod supervisor;
pub mod trigger;

pub use settings::Settings;
pub use supervisor::UpdateSupervisor;
