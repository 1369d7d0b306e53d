pub mod sanitizer;
