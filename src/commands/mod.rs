pub mod generate_config;
pub mod inspect;
pub mod test;

pub use self::generate_config::generate_config;
pub use self::inspect::inspect;
pub use self::test::test;
