pub mod lzf;
