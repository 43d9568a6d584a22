//! # Blog migrations
//!
//! Ordered schema history for the blog database. Each migration only declares
//! the target structure; sea-orm-migration records and applies them.

pub use sea_orm_migration::prelude::*;

mod m20221226_000001_initial;
mod m20221227_024800_alter_post_managers_comments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20221226_000001_initial::Migration),
            Box::new(m20221227_024800_alter_post_managers_comments::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "m20221226_000001_initial",
                "m20221227_024800_alter_post_managers_comments",
            ]
        );

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
