//! Use case wiring
//!
//! Every use case holds its repository behind an `Arc`, so the bundles below
//! are cheap to build once at startup and share across callers.

use crate::use_cases::{
    CompleteTodo, CreateCatalogEntry, CreateRelato, CreateTodo, DeleteCatalogEntry, DeleteRelato,
    DeleteTodo, GetRelato, GetRelatoStats, GetTodo, GetTodoStats, ListCatalog, ListRelatos,
    ListTodos, ReopenRelato, ReopenTodo, ResolveRelato, SharedRelatoRepository,
    SharedTodoRepository, TodoListDefaults, UpdateCatalogEntry, UpdateRelato, UpdateTodo,
};

pub struct TodoUseCases {
    pub create: CreateTodo,
    pub list: ListTodos,
    pub get: GetTodo,
    pub update: UpdateTodo,
    pub complete: CompleteTodo,
    pub reopen: ReopenTodo,
    pub delete: DeleteTodo,
    pub stats: GetTodoStats,
}

impl TodoUseCases {
    pub fn new(repo: SharedTodoRepository, defaults: TodoListDefaults) -> Self {
        Self {
            create: CreateTodo::new(repo.clone()),
            list: ListTodos::new(repo.clone(), defaults),
            get: GetTodo::new(repo.clone()),
            update: UpdateTodo::new(repo.clone()),
            complete: CompleteTodo::new(repo.clone()),
            reopen: ReopenTodo::new(repo.clone()),
            delete: DeleteTodo::new(repo.clone()),
            stats: GetTodoStats::new(repo),
        }
    }
}

pub struct RelatoUseCases {
    pub create: CreateRelato,
    pub list: ListRelatos,
    pub get: GetRelato,
    pub update: UpdateRelato,
    pub resolve: ResolveRelato,
    pub reopen: ReopenRelato,
    pub delete: DeleteRelato,
    pub stats: GetRelatoStats,
}

impl RelatoUseCases {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self {
            create: CreateRelato::new(repo.clone()),
            list: ListRelatos::new(repo.clone()),
            get: GetRelato::new(repo.clone()),
            update: UpdateRelato::new(repo.clone()),
            resolve: ResolveRelato::new(repo.clone()),
            reopen: ReopenRelato::new(repo.clone()),
            delete: DeleteRelato::new(repo.clone()),
            stats: GetRelatoStats::new(repo),
        }
    }
}

pub struct CatalogUseCases {
    pub list: ListCatalog,
    pub create: CreateCatalogEntry,
    pub update: UpdateCatalogEntry,
    pub delete: DeleteCatalogEntry,
}

impl CatalogUseCases {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self {
            list: ListCatalog::new(repo.clone()),
            create: CreateCatalogEntry::new(repo.clone()),
            update: UpdateCatalogEntry::new(repo.clone()),
            delete: DeleteCatalogEntry::new(repo),
        }
    }
}

/// All use cases over one pair of repositories
pub struct UseCases {
    pub todos: TodoUseCases,
    pub relatos: RelatoUseCases,
    pub catalog: CatalogUseCases,
}

impl UseCases {
    pub fn new(
        todo_repo: SharedTodoRepository,
        relato_repo: SharedRelatoRepository,
        defaults: TodoListDefaults,
    ) -> Self {
        Self {
            todos: TodoUseCases::new(todo_repo, defaults),
            relatos: RelatoUseCases::new(relato_repo.clone()),
            catalog: CatalogUseCases::new(relato_repo),
        }
    }
}
