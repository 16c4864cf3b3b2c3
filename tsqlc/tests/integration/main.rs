mod json;
mod sql;
