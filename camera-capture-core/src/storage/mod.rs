pub mod files;
pub mod picture_writer;
