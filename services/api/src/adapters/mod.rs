pub mod db;
pub mod description_llm;
pub mod memory;

pub use db::DbAdapter;
pub use description_llm::OpenAiDescriptionAdapter;
pub use memory::MemorySiteRepository;
