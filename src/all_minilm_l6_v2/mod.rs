pub const MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const VECTOR_SIZE: u64 = 384; // all-MiniLM-L6-v2 embedding Size: 384 dimensions
pub const LOCAL_MODEL_DIR: &str = "all-MiniLM-L6-v2";

pub const INDEX_NAME: &str = "medicalbot";

pub const CHUNK_SIZE: usize = 500;
pub const CHUNK_OVERLAP: usize = 20;
