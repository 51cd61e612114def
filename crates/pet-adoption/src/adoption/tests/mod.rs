mod common;
mod shelters;
