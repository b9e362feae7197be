// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod compressor;
pub mod supabase;

pub use compressor::JpegCompressor;
pub use supabase::SupabaseClient;
