pub mod mood_poller;
