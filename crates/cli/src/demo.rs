//! A small book catalog used by the `sdl` and `query` commands.

use std::sync::Arc;

use {
    anyhow::{Context, anyhow},
    async_graphql::dynamic::Schema,
    schemagen_config::EngineConfig,
    schemagen_graphql::{Page, PaginationArgs, SchemaGenerator},
    schemagen_metadata::{
        ArgumentDescriptor, DomainType, EnumType, Invocation, ObjectType, OperationDescriptor,
        Primitive, StaticOperationSource,
    },
    serde_json::{Map, Value, json},
    tokio::sync::RwLock,
};

const DEFAULT_PAGE_SIZE: u64 = 10;

/// In-memory catalog handed to operations as host data.
pub struct Catalog {
    authors: Vec<Value>,
    publications: RwLock<Vec<Value>>,
}

impl Catalog {
    pub fn seeded() -> Self {
        let authors = vec![
            json!({ "id": "1", "name": "Ursula K. Le Guin" }),
            json!({ "id": "2", "name": "Frank Herbert" }),
        ];
        let publications = vec![
            book_record("1", "A Wizard of Earthsea", 1968, "FANTASY", "1"),
            book_record("2", "The Left Hand of Darkness", 1969, "SCIENCE_FICTION", "1"),
            book_record("3", "Dune", 1965, "SCIENCE_FICTION", "2"),
            book_record("4", "The Dispossessed", 1974, "SCIENCE_FICTION", "1"),
            json!({ "_type": "Magazine", "title": "Galaxy", "year": 1950, "issue": 1 }),
        ];
        Self {
            authors,
            publications: RwLock::new(publications),
        }
    }

    fn author(&self, id: &str) -> Option<Value> {
        self.authors.iter().find(|a| a["id"] == id).cloned()
    }

    async fn books(&self) -> Vec<Value> {
        self.publications
            .read()
            .await
            .iter()
            .filter(|p| p["_type"] == "Book")
            .cloned()
            .collect()
    }

    async fn book(&self, id: &str) -> Option<Value> {
        self.books().await.into_iter().find(|b| b["id"] == id)
    }

    async fn add_book(&self, mut book: Map<String, Value>) -> Value {
        let mut publications = self.publications.write().await;
        let id = publications.len() + 1;
        book.insert("_type".into(), "Book".into());
        book.insert("id".into(), id.to_string().into());
        let book = Value::Object(book);
        publications.push(book.clone());
        book
    }
}

fn book_record(id: &str, title: &str, year: u16, genre: &str, author_id: &str) -> Value {
    json!({
        "_type": "Book",
        "id": id,
        "title": title,
        "year": year,
        "genre": genre,
        "authorId": author_id,
    })
}

fn catalog(call: &Invocation) -> anyhow::Result<&Catalog> {
    call.context
        .data::<Catalog>()
        .ok_or_else(|| anyhow!("catalog missing from execution context"))
}

fn string_argument(call: &Invocation, name: &str) -> anyhow::Result<String> {
    call.argument_as::<String>(name)?
        .with_context(|| format!("argument `{name}` is required"))
}

fn genre() -> Arc<EnumType> {
    EnumType::new("Genre", ["FANTASY", "SCIENCE_FICTION", "NON_FICTION"])
}

fn publication() -> Arc<ObjectType> {
    ObjectType::builder("Publication")
        .qualified_name("catalog::Publication")
        .description("Anything the catalog lists")
        .abstract_type()
        .field(OperationDescriptor::new("title", Primitive::String))
        .field(OperationDescriptor::new(
            "year",
            DomainType::optional(Primitive::U16.into()),
        ))
        .build()
}

fn author() -> Arc<ObjectType> {
    ObjectType::builder("Author")
        .qualified_name("catalog::Author")
        .field(OperationDescriptor::new("id", Primitive::Id))
        .field(OperationDescriptor::new("name", Primitive::String))
        .field(
            OperationDescriptor::new("books", DomainType::list(DomainType::reference("Book")))
                .description("Books written by this author")
                .resolve_with(|call: Invocation| async move {
                    let author_id = call.source.as_ref().map(|a| a["id"].clone());
                    let books = catalog(&call)?
                        .books()
                        .await
                        .into_iter()
                        .filter(|b| Some(&b["authorId"]) == author_id.as_ref())
                        .collect();
                    Ok(Value::Array(books))
                }),
        )
        .build()
}

fn book(publication: &Arc<ObjectType>, author: &Arc<ObjectType>) -> Arc<ObjectType> {
    ObjectType::builder("Book")
        .qualified_name("catalog::Book")
        .implements(Arc::clone(publication))
        .field(OperationDescriptor::new("id", Primitive::Id))
        .field(OperationDescriptor::new("genre", genre()))
        .field(
            OperationDescriptor::new("author", DomainType::optional(Arc::clone(author).into()))
                .resolve_with(|call: Invocation| async move {
                    let author_id = call
                        .source
                        .as_ref()
                        .and_then(|b| b["authorId"].as_str())
                        .unwrap_or_default();
                    Ok(catalog(&call)?.author(author_id).unwrap_or(Value::Null))
                }),
        )
        .build()
}

fn magazine(publication: &Arc<ObjectType>) -> Arc<ObjectType> {
    ObjectType::builder("Magazine")
        .qualified_name("catalog::Magazine")
        .implements(Arc::clone(publication))
        .field(OperationDescriptor::new("issue", Primitive::U16))
        .build()
}

/// Root operations of the catalog.
pub fn source() -> StaticOperationSource {
    let publication = publication();
    let author = author();
    let book = book(&publication, &author);

    let get_book = OperationDescriptor::new("book", DomainType::optional(Arc::clone(&book).into()))
        .description("Look up a book by its catalog id")
        .argument(ArgumentDescriptor::new("id", Primitive::String))
        .resolve_with(|call: Invocation| async move {
            let id = string_argument(&call, "id")?;
            Ok(catalog(&call)?.book(&id).await.unwrap_or(Value::Null))
        });

    let get_author =
        OperationDescriptor::new("author", DomainType::optional(Arc::clone(&author).into()))
            .argument(ArgumentDescriptor::new("id", Primitive::String))
            .resolve_with(|call: Invocation| async move {
                let id = string_argument(&call, "id")?;
                Ok(catalog(&call)?.author(&id).unwrap_or(Value::Null))
            });

    let books = OperationDescriptor::new("books", DomainType::page(Arc::clone(&book).into()))
        .description("All books, optionally of one genre")
        .argument(ArgumentDescriptor::new(
            "genre",
            DomainType::optional(genre().into()),
        ))
        .resolve_with(|call: Invocation| async move {
            let pagination = PaginationArgs::from_arguments(&call.arguments)?;
            let offset = pagination.offset()?;
            let genre = call.argument("genre").filter(|g| !g.is_null()).cloned();
            let matching: Vec<Value> = catalog(&call)?
                .books()
                .await
                .into_iter()
                .filter(|b| genre.as_ref().is_none_or(|g| &b["genre"] == g))
                .collect();
            let total = matching.len() as u64;
            let nodes = matching
                .into_iter()
                .skip(usize::try_from(offset)?)
                .take(usize::try_from(pagination.first.unwrap_or(DEFAULT_PAGE_SIZE))?)
                .collect();
            Ok(Page::offset_based(nodes, total, offset).to_value()?)
        });

    let search = OperationDescriptor::new(
        "search",
        DomainType::list(DomainType::Object(Arc::clone(&publication))),
    )
    .description("Publications of the example's concrete type whose title contains its title")
    .argument(ArgumentDescriptor::new(
        "example",
        DomainType::Object(Arc::clone(&publication)),
    ))
    .resolve_with(|call: Invocation| async move {
        let example = call
            .argument("example")
            .cloned()
            .context("argument `example` is required")?;
        let needle = example["title"].as_str().unwrap_or_default().to_lowercase();
        let publications = catalog(&call)?.publications.read().await;
        let found = publications
            .iter()
            .filter(|p| p["_type"] == example["_type"])
            .filter(|p| {
                p["title"]
                    .as_str()
                    .is_some_and(|t| t.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Ok(Value::Array(found))
    });

    let add_book = OperationDescriptor::new("addBook", Arc::clone(&book))
        .argument(ArgumentDescriptor::new("title", Primitive::String))
        .argument(ArgumentDescriptor::new(
            "year",
            DomainType::optional(Primitive::U16.into()),
        ))
        .argument(ArgumentDescriptor::new("genre", genre()))
        .argument(ArgumentDescriptor::new("authorId", Primitive::String))
        .resolve_with(|call: Invocation| async move {
            let catalog = catalog(&call)?;
            let author_id = string_argument(&call, "authorId")?;
            if catalog.author(&author_id).is_none() {
                anyhow::bail!("no author with id {author_id}");
            }
            Ok(catalog.add_book(call.arguments.clone()).await)
        });

    StaticOperationSource::new()
        .query(get_book)
        .query(get_author)
        .query(books)
        .query(search)
        .mutation(add_book)
        .additional_type(magazine(&publication))
}

/// The catalog schema, seeded with a handful of records.
pub fn schema(config: EngineConfig) -> anyhow::Result<Schema> {
    Ok(SchemaGenerator::new(config)
        .with_data(Catalog::seeded())
        .generate(&source())?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, async_graphql::Request};

    async fn run(schema: &Schema, query: &str) -> Value {
        let response = schema.execute(Request::new(query)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        response.data.into_json().unwrap()
    }

    fn catalog_schema() -> Schema {
        schema(EngineConfig::default()).unwrap()
    }

    #[test]
    fn sdl_contains_catalog_types() {
        let sdl = catalog_schema().sdl();
        for needle in [
            "interface Publication",
            "interface Node",
            "type Magazine implements Publication",
            "type BookConnection",
            "enum Genre",
            "input PublicationInput",
            "type Mutation",
        ] {
            assert!(sdl.contains(needle), "missing {needle}");
        }
    }

    #[tokio::test]
    async fn follows_references_between_books_and_authors() {
        let schema = catalog_schema();
        let data = run(
            &schema,
            r#"{ book(id: "3") { title genre author { name books { title } } } }"#,
        )
        .await;
        assert_eq!(
            data,
            json!({ "book": {
                "title": "Dune",
                "genre": "SCIENCE_FICTION",
                "author": { "name": "Frank Herbert", "books": [{ "title": "Dune" }] },
            }})
        );
    }

    #[tokio::test]
    async fn node_lookup_reaches_authors() {
        let schema = catalog_schema();
        let data = run(&schema, r#"{ author(id: "2") { id } }"#).await;
        let id = data["author"]["id"].as_str().unwrap().to_string();

        let data = run(
            &schema,
            &format!(r#"{{ node(id: "{id}") {{ ... on Author {{ name }} }} }}"#),
        )
        .await;
        assert_eq!(data["node"]["name"], "Frank Herbert");
    }

    #[tokio::test]
    async fn pages_through_books_of_a_genre() {
        let schema = catalog_schema();
        let data = run(
            &schema,
            r#"{ books(genre: SCIENCE_FICTION, first: 2) {
                edges { cursor node { title } }
                pageInfo { hasNextPage endCursor }
            } }"#,
        )
        .await;
        assert_eq!(data["books"]["edges"][1]["node"]["title"], "Dune");
        assert_eq!(data["books"]["pageInfo"], json!({ "hasNextPage": true, "endCursor": "2" }));
    }

    #[tokio::test]
    async fn searches_by_concrete_type() {
        let schema = catalog_schema();
        let data = run(
            &schema,
            r#"{ search(example: { _type: "Magazine", title: "gal" }) {
                __typename title ... on Magazine { issue }
            } }"#,
        )
        .await;
        assert_eq!(
            data,
            json!({ "search": [{ "__typename": "Magazine", "title": "Galaxy", "issue": 1 }] })
        );
    }

    #[tokio::test]
    async fn added_books_are_queryable() {
        let schema = catalog_schema();
        let data = run(
            &schema,
            r#"mutation { addBook(title: "Children of Dune", year: 1976, genre: SCIENCE_FICTION, authorId: "2") { title author { name } } }"#,
        )
        .await;
        assert_eq!(data["addBook"]["author"]["name"], "Frank Herbert");

        let data = run(&schema, r#"{ book(id: "6") { title } }"#).await;
        assert_eq!(data["book"]["title"], "Children of Dune");
    }
}
