//! Query parsing.
//!
//! A query is a single line of whitespace-separated tokens. The first token
//! is the verb; `LIST`, `CREATE` and `DELETE` take a second token that
//! selects what they act on.

use crate::error::{ServerError, ServerResult};
use dossier_core::IndexType;
use std::fmt;
use std::str::FromStr;

/// A parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `LIST collections`
    ListCollections,
    /// `LIST indexes <collection>`
    ListIndexes {
        /// Collection to list.
        collection: String,
    },
    /// `LIST keys <collection> <index>`
    ListKeys {
        /// Owning collection.
        collection: String,
        /// Index to read.
        index: String,
    },
    /// `CREATE <collection>`
    CreateCollection {
        /// Collection name.
        name: String,
    },
    /// `CREATE INDEX <collection> <name> [UNIQUE|ORDERED]`
    CreateIndex {
        /// Owning collection.
        collection: String,
        /// Index name.
        name: String,
        /// Index type, `UNIQUE` when omitted.
        index_type: IndexType,
    },
    /// `DELETE <collection>`
    DeleteCollection {
        /// Collection name.
        name: String,
    },
    /// `DELETE INDEX <collection> <name>`
    DeleteIndex {
        /// Owning collection.
        collection: String,
        /// Index name.
        name: String,
    },
    /// `INSERT <collection> <index> <key>`
    Insert {
        /// Owning collection.
        collection: String,
        /// Index to insert into.
        index: String,
        /// Key to insert.
        key: i64,
    },
    /// `LOAD <collection>`
    Load {
        /// Collection to reload.
        collection: String,
    },
}

impl FromStr for Query {
    type Err = ServerError;

    fn from_str(text: &str) -> ServerResult<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let Some((verb, args)) = tokens.split_first() else {
            return Err(ServerError::syntax("empty query"));
        };

        match verb.to_ascii_uppercase().as_str() {
            "LIST" => parse_list(args),
            "CREATE" => parse_create(args),
            "DELETE" => parse_delete(args),
            "INSERT" => {
                let [collection, index, key] = expect_args::<3>("INSERT", args)?;
                let key = key
                    .parse()
                    .map_err(|_| ServerError::syntax(format!("invalid key '{key}'")))?;
                Ok(Query::Insert {
                    collection: collection.to_string(),
                    index: index.to_string(),
                    key,
                })
            }
            "LOAD" => {
                let [collection] = expect_args::<1>("LOAD", args)?;
                Ok(Query::Load {
                    collection: collection.to_string(),
                })
            }
            _ => Err(ServerError::syntax(format!("unknown command '{verb}'"))),
        }
    }
}

fn parse_list(args: &[&str]) -> ServerResult<Query> {
    let Some((target, rest)) = args.split_first() else {
        return Err(ServerError::syntax("LIST needs an operand"));
    };
    match target.to_ascii_lowercase().as_str() {
        "collections" => {
            expect_args::<0>("LIST collections", rest)?;
            Ok(Query::ListCollections)
        }
        "indexes" => {
            let [collection] = expect_args::<1>("LIST indexes", rest)?;
            Ok(Query::ListIndexes {
                collection: collection.to_string(),
            })
        }
        "keys" => {
            let [collection, index] = expect_args::<2>("LIST keys", rest)?;
            Ok(Query::ListKeys {
                collection: collection.to_string(),
                index: index.to_string(),
            })
        }
        _ => Err(ServerError::syntax(format!(
            "invalid operand '{target}' passed to LIST command"
        ))),
    }
}

fn parse_create(args: &[&str]) -> ServerResult<Query> {
    match args {
        [name] => Ok(Query::CreateCollection {
            name: name.to_string(),
        }),
        [kw, collection, name] if kw.eq_ignore_ascii_case("INDEX") => Ok(Query::CreateIndex {
            collection: collection.to_string(),
            name: name.to_string(),
            index_type: IndexType::default(),
        }),
        [kw, collection, name, index_type] if kw.eq_ignore_ascii_case("INDEX") => {
            let index_type = index_type.parse().map_err(|_| {
                ServerError::syntax(format!("unknown index type '{index_type}'"))
            })?;
            Ok(Query::CreateIndex {
                collection: collection.to_string(),
                name: name.to_string(),
                index_type,
            })
        }
        [kw, _] if kw.eq_ignore_ascii_case("INDEX") => Err(ServerError::syntax(
            "not enough arguments supplied to CREATE INDEX",
        )),
        [] => Err(ServerError::syntax("CREATE needs a name")),
        _ => Err(ServerError::syntax("too many arguments supplied to CREATE")),
    }
}

fn parse_delete(args: &[&str]) -> ServerResult<Query> {
    match args {
        [name] => Ok(Query::DeleteCollection {
            name: name.to_string(),
        }),
        [kw, collection, name] if kw.eq_ignore_ascii_case("INDEX") => Ok(Query::DeleteIndex {
            collection: collection.to_string(),
            name: name.to_string(),
        }),
        [kw, _] if kw.eq_ignore_ascii_case("INDEX") => Err(ServerError::syntax(
            "not enough arguments supplied to DELETE INDEX",
        )),
        [] => Err(ServerError::syntax("DELETE needs a name")),
        _ => Err(ServerError::syntax("too many arguments supplied to DELETE")),
    }
}

fn expect_args<'a, const N: usize>(command: &str, args: &[&'a str]) -> ServerResult<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| {
        let problem = if args.len() > N { "too many" } else { "not enough" };
        ServerError::syntax(format!("{problem} arguments supplied to {command}"))
    })
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::ListCollections => write!(f, "LIST collections"),
            Query::ListIndexes { collection } => write!(f, "LIST indexes {collection}"),
            Query::ListKeys { collection, index } => write!(f, "LIST keys {collection} {index}"),
            Query::CreateCollection { name } => write!(f, "CREATE {name}"),
            Query::CreateIndex {
                collection,
                name,
                index_type,
            } => write!(f, "CREATE INDEX {collection} {name} {index_type}"),
            Query::DeleteCollection { name } => write!(f, "DELETE {name}"),
            Query::DeleteIndex { collection, name } => write!(f, "DELETE INDEX {collection} {name}"),
            Query::Insert {
                collection,
                index,
                key,
            } => write!(f, "INSERT {collection} {index} {key}"),
            Query::Load { collection } => write!(f, "LOAD {collection}"),
        }
    }
}
