pub mod ferplus_classifier;
