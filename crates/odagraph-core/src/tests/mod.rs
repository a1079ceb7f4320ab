mod resolve;
mod service;
