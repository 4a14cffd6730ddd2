//! Diff engine - decides New / Unchanged / Changed per entry

mod compare;

pub use compare::compare_files;
