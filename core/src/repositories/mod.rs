pub mod memory;
pub mod session;
pub mod user;

pub use memory::InMemoryStore;
pub use session::SessionRepository;
pub use user::UserRepository;
