pub mod heap_file;
pub mod heap_file_scan;
pub mod insert_file_scan;
pub mod predicate;

#[cfg(test)]
mod heap_file_test;
#[cfg(test)]
mod predicate_test;
