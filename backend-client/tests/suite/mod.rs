mod documents;
mod preview;
mod search;
