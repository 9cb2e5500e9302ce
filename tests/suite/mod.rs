mod history;
mod session;
