mod name_gen;

pub use name_gen::NameGenerator;
