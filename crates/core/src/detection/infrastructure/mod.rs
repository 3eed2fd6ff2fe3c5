pub mod ultraface_detector;
