mod app;
mod dom;
mod download;
mod net;
mod render;
mod signal;
mod state;
mod util;
mod ws;

pub use app::run;
