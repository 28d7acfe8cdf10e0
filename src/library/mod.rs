// Library module
// Collects audio files from a folder for compilation

pub mod scanner;

pub use scanner::DirectoryScanner;
