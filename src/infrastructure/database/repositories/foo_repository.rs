//! SeaORM implementation of FooRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RuntimeErr, Set, SqlErr, Statement,
    TransactionTrait,
};
use tracing::debug;

use crate::domain::foo::model::FOO_ENTITY;
use crate::domain::{DomainError, DomainResult, Foo, FooFilter, FooRepository, FooUnitOfWork};
use crate::infrastructure::database::entities::foo;
use crate::shared::ListResult;

// ── Conversion helpers ──────────────────────────────────────────

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

fn db_err(e: DbErr) -> DomainError {
    DomainError::internal(format!("Database error: {}", e))
}

/// SQLite reports a competing writer as BUSY/LOCKED (extended codes keep the
/// primary code in the low byte).
fn is_lock_contention(e: &DbErr) -> bool {
    let (DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db)))
    | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db)))
    | DbErr::Conn(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db)))) = e
    else {
        return false;
    };
    db.code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

/// Errors from a write inside a unit of work. Losing a write race is a
/// conflict, same as a stale version.
fn write_err(e: DbErr, id: &str) -> DomainError {
    if is_lock_contention(&e) {
        DomainError::conflict(format!("foo {} is being modified concurrently", id))
    } else {
        db_err(e)
    }
}

/// `LIKE` pattern for a case-folded substring match. `%`, `_` and `\` in the
/// term match literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn entity_to_domain(m: foo::Model) -> Foo {
    Foo {
        id: m.id,
        org_id: m.org_id,
        namespace: m.namespace,
        name: m.name,
        version: m.version,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(f: &Foo) -> foo::ActiveModel {
    foo::ActiveModel {
        id: Set(f.id.clone()),
        org_id: Set(f.org_id.clone()),
        namespace: Set(f.namespace.clone()),
        name: Set(f.name.clone()),
        search_name: Set(f.name.to_lowercase()),
        version: Set(f.version),
        created_at: Set(f.created_at),
        updated_at: Set(f.updated_at),
    }
}

// ── SeaOrmFooRepository ─────────────────────────────────────────

pub struct SeaOrmFooRepository {
    db: DatabaseConnection,
}

impl SeaOrmFooRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FooRepository for SeaOrmFooRepository {
    async fn begin(&self) -> DomainResult<Box<dyn FooUnitOfWork>> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Ok(Box::new(SeaOrmFooUnitOfWork { txn }))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Foo>> {
        let model = foo::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(entity_to_domain))
    }

    async fn list(&self, filter: &FooFilter) -> DomainResult<ListResult<Foo>> {
        let mut query = foo::Entity::find()
            .filter(foo::Column::OrgId.eq(filter.org_id.as_str()))
            .filter(foo::Column::Namespace.eq(filter.namespace.as_str()));

        if let Some(ref term) = filter.search {
            query = query.filter(
                Expr::col((foo::Entity, foo::Column::SearchName))
                    .like(LikeExpr::new(contains_pattern(term)).escape('\\')),
            );
        }

        let query = query
            .order_by_desc(foo::Column::CreatedAt)
            .order_by_asc(foo::Column::Id);

        // Count total
        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = query
            .offset(filter.offset)
            .limit(filter.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(ListResult::new(
            models.into_iter().map(entity_to_domain).collect(),
            total,
        ))
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

// ── Unit of work ────────────────────────────────────────────────

/// Wraps a live `DatabaseTransaction`. SeaORM rolls it back on drop.
struct SeaOrmFooUnitOfWork {
    txn: DatabaseTransaction,
}

#[async_trait]
impl FooUnitOfWork for SeaOrmFooUnitOfWork {
    async fn find_by_id(&mut self, id: &str) -> DomainResult<Option<Foo>> {
        let model = foo::Entity::find_by_id(id.to_string())
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(model.map(entity_to_domain))
    }

    async fn insert(&mut self, f: &Foo) -> DomainResult<()> {
        foo::Entity::insert(domain_to_active(f))
            .exec_without_returning(&self.txn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    DomainError::conflict(format!("foo with id {} already exists", f.id))
                }
                _ => write_err(e, &f.id),
            })?;
        debug!(foo_id = %f.id, "Foo row inserted");
        Ok(())
    }

    async fn update(&mut self, f: &Foo, expected_version: i64) -> DomainResult<()> {
        let result = foo::Entity::update_many()
            .col_expr(foo::Column::Name, Expr::value(f.name.clone()))
            .col_expr(foo::Column::SearchName, Expr::value(f.name.to_lowercase()))
            .col_expr(foo::Column::Version, Expr::value(f.version))
            .col_expr(foo::Column::UpdatedAt, Expr::value(f.updated_at))
            .filter(foo::Column::Id.eq(f.id.as_str()))
            .filter(foo::Column::Version.eq(expected_version))
            .exec(&self.txn)
            .await
            .map_err(|e| write_err(e, &f.id))?;

        if result.rows_affected == 0 {
            return Err(DomainError::conflict(format!(
                "foo {} was modified concurrently",
                f.id
            )));
        }
        Ok(())
    }

    async fn delete(&mut self, id: &str) -> DomainResult<()> {
        let result = foo::Entity::delete_by_id(id.to_string())
            .exec(&self.txn)
            .await
            .map_err(|e| write_err(e, id))?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found(FOO_ENTITY, id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        self.txn.commit().await.map_err(|e| {
            if is_lock_contention(&e) {
                DomainError::conflict("foo was modified concurrently")
            } else {
                db_err(e)
            }
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────
