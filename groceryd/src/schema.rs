//! GraphQL schema.
//!
//! Thin `async-graphql` roots over [`Resolvers`]. Field and argument names
//! are camelCased by `async-graphql` (`grocery_list(store_id)` is exposed as
//! `groceryList(storeId: Int!)`).

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Object, Schema};

use grocery_domain::{
    Department, DepartmentId, GroceryList, GroceryListId, Product, ProductId, Store, StoreId,
};

use crate::resolvers::Resolvers;

/// The executable schema.
pub type GrocerySchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the resolvers attached as context data.
pub fn build_schema(resolvers: Arc<Resolvers>) -> GrocerySchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).data(resolvers).finish()
}

fn resolvers<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<Resolvers>> {
    ctx.data::<Arc<Resolvers>>()
}

/// Read operations.
pub struct QueryRoot;

#[Object(name = "Query")]
impl QueryRoot {
    async fn departments(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Department>> {
        Ok(resolvers(ctx)?.departments().await?)
    }

    async fn products(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Product>> {
        Ok(resolvers(ctx)?.products().await?)
    }

    async fn stores(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Store>> {
        Ok(resolvers(ctx)?.stores().await?)
    }

    async fn grocery_lists(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GroceryList>> {
        Ok(resolvers(ctx)?.grocery_lists().await?)
    }

    /// The grocery list of a store, or null.
    async fn grocery_list(
        &self,
        ctx: &Context<'_>,
        store_id: StoreId,
    ) -> async_graphql::Result<Option<GroceryList>> {
        Ok(resolvers(ctx)?.grocery_list(store_id).await?)
    }
}

/// Write operations. A failed operation resolves to null.
pub struct MutationRoot;

#[Object(name = "Mutation")]
impl MutationRoot {
    async fn add_department_to_store(
        &self,
        ctx: &Context<'_>,
        department_name: String,
        store_id: StoreId,
    ) -> async_graphql::Result<Option<Store>> {
        Ok(resolvers(ctx)?.add_department_to_store(&department_name, store_id).await)
    }

    async fn update_departments_for_store(
        &self,
        ctx: &Context<'_>,
        departments: Vec<Department>,
        store_id: StoreId,
    ) -> async_graphql::Result<Option<Store>> {
        Ok(resolvers(ctx)?.update_departments_for_store(departments, store_id).await)
    }

    async fn add_product(
        &self,
        ctx: &Context<'_>,
        name: String,
        department_id: DepartmentId,
    ) -> async_graphql::Result<Option<Product>> {
        Ok(resolvers(ctx)?.add_product(&name, department_id).await)
    }

    async fn add_product_to_grocery_list(
        &self,
        ctx: &Context<'_>,
        product_id: ProductId,
        grocery_list_id: GroceryListId,
    ) -> async_graphql::Result<Option<GroceryList>> {
        Ok(resolvers(ctx)?.add_product_to_grocery_list(product_id, grocery_list_id).await)
    }

    async fn remove_product_from_grocery_list(
        &self,
        ctx: &Context<'_>,
        product_id: ProductId,
        grocery_list_id: GroceryListId,
    ) -> async_graphql::Result<Option<GroceryList>> {
        Ok(resolvers(ctx)?.remove_product_from_grocery_list(product_id, grocery_list_id).await)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use grocery_store::{BackendRepositories, MemoryBackend};
    use grocery_testkit::seed_catalog;

    async fn schema_with_catalog() -> (GrocerySchema, grocery_testkit::Catalog) {
        let repos = Arc::new(BackendRepositories::new(Arc::new(MemoryBackend::new())));
        let catalog = seed_catalog(repos.as_ref()).await.unwrap();
        (build_schema(Arc::new(Resolvers::new(repos))), catalog)
    }

    #[tokio::test]
    async fn test_sdl_declares_all_operations() {
        let (schema, _) = schema_with_catalog().await;
        let sdl = schema.sdl();

        for field in [
            "departments: [Department!]!",
            "products: [Product!]!",
            "stores: [Store!]!",
            "groceryLists: [GroceryList!]!",
            "groceryList(storeId: Int!): GroceryList",
            "addDepartmentToStore(departmentName: String!, storeId: Int!): Store",
            "updateDepartmentsForStore(departments: [DepartmentInput!]!, storeId: Int!): Store",
            "addProduct(name: String!, departmentId: Int!): Product",
            "addProductToGroceryList(productId: Int!, groceryListId: Int!): GroceryList",
            "removeProductFromGroceryList(productId: Int!, groceryListId: Int!): GroceryList",
        ] {
            assert!(sdl.contains(field), "missing `{}` in\n{}", field, sdl);
        }
        assert!(sdl.contains("departmentId: Int!"));
        assert!(sdl.contains("storeId: Int!"));
    }

    #[tokio::test]
    async fn test_query_grocery_list() {
        let (schema, catalog) = schema_with_catalog().await;

        let query = format!(
            "{{ groceryList(storeId: {}) {{ id storeId products {{ name departmentId }} }} }}",
            catalog.store.id
        );
        let response = schema.execute(query).await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(data["groceryList"]["id"], catalog.grocery_list.id);
        assert_eq!(data["groceryList"]["products"][0]["name"], "Milk");
        assert_eq!(data["groceryList"]["products"][0]["departmentId"], catalog.dairy.id);
    }

    #[tokio::test]
    async fn test_missing_grocery_list_is_null_without_errors() {
        let (schema, _) = schema_with_catalog().await;

        let response = schema.execute("{ groceryList(storeId: 42) { id } }").await;

        assert!(response.errors.is_empty());
        assert_eq!(response.data.into_json().unwrap(), serde_json::json!({"groceryList": null}));
    }

    #[tokio::test]
    async fn test_failed_mutation_is_null_without_errors() {
        let (schema, _) = schema_with_catalog().await;

        let response = schema
            .execute(
                r#"mutation {
                    addDepartmentToStore(departmentName: "Dairy", storeId: 999) { id }
                }"#,
            )
            .await;

        assert!(response.errors.is_empty());
        assert_eq!(
            response.data.into_json().unwrap(),
            serde_json::json!({"addDepartmentToStore": null})
        );
    }

    #[tokio::test]
    async fn test_update_departments_with_input_objects() {
        let (schema, catalog) = schema_with_catalog().await;

        let query = format!(
            r#"mutation {{
                updateDepartmentsForStore(
                    departments: [{{id: {}, name: "Produce"}}, {{id: 50, name: "Floral"}}],
                    storeId: {}
                ) {{ id departments {{ id name }} }}
            }}"#,
            catalog.produce.id, catalog.store.id
        );
        let response = schema.execute(query).await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(
            data["updateDepartmentsForStore"]["departments"],
            serde_json::json!([
                {"id": catalog.produce.id, "name": "Produce"},
                {"id": 50, "name": "Floral"}
            ])
        );
    }
}
