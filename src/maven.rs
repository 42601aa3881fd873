pub mod coordinates;
pub mod paths;
pub mod pom;
pub mod remote_repo;
