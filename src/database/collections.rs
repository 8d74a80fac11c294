//! Registry of orderable collections.
//!
//! A collection is a table whose rows carry an integer position column
//! (`orden`) that decides display order on the website.

use crate::database::columns::ColumnDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Resolution of a list column of ids into slugs of another table
#[derive(Debug)]
pub struct SlugSource {
    /// List column holding the ids
    pub column: &'static str,
    /// Response key receiving the resolved slugs
    pub target: &'static str,
    pub table: &'static str,
    pub slug_column: &'static str,
}

#[derive(Debug)]
pub struct Collection {
    /// Route segment, e.g. `/api/tipos-trabajo`
    pub name: &'static str,
    pub table: &'static str,
    pub position_column: &'static str,
    pub sort: SortDirection,
    /// Every column except `id`
    pub columns: &'static [ColumnDef],
    pub slugs: Option<SlugSource>,
}

impl Collection {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub const PROYECTOS: Collection = Collection {
    name: "proyectos",
    table: "proyectos",
    position_column: "orden",
    sort: SortDirection::Asc,
    columns: &[
        ColumnDef::text("titulo"),
        ColumnDef::text("descripcion"),
        ColumnDef::text("cliente"),
        ColumnDef::text("ubicacion"),
        ColumnDef::text("imagen"),
        ColumnDef::list("tags"),
        ColumnDef::list("galeria"),
        ColumnDef::list("documentos"),
        ColumnDef::list("categoria"),
        ColumnDef::integer("destacado"),
        ColumnDef::integer("orden"),
    ],
    slugs: Some(SlugSource {
        column: "categoria",
        target: "categorias",
        table: "tipos_trabajo",
        slug_column: "slug",
    }),
};

pub const TIPOS_TRABAJO: Collection = Collection {
    name: "tipos-trabajo",
    table: "tipos_trabajo",
    position_column: "orden",
    sort: SortDirection::Asc,
    columns: &[
        ColumnDef::text("nombre"),
        ColumnDef::text("slug"),
        ColumnDef::text("descripcion"),
        ColumnDef::text("icono"),
        ColumnDef::text("imagen"),
        ColumnDef::integer("orden"),
    ],
    slugs: None,
};

pub const ESTADISTICAS: Collection = Collection {
    name: "estadisticas",
    table: "estadisticas",
    position_column: "orden",
    sort: SortDirection::Asc,
    columns: &[
        ColumnDef::text("etiqueta"),
        ColumnDef::text("valor"),
        ColumnDef::text("sufijo"),
        ColumnDef::text("icono"),
        ColumnDef::integer("orden"),
    ],
    slugs: None,
};

pub const KNOWLEDGE: Collection = Collection {
    name: "knowledge",
    table: "assistant_knowledge",
    position_column: "orden",
    sort: SortDirection::Desc,
    columns: &[
        ColumnDef::text("pregunta"),
        ColumnDef::text("respuesta"),
        ColumnDef::list("palabras_clave"),
        ColumnDef::integer("activo"),
        ColumnDef::integer("orden"),
    ],
    slugs: None,
};

pub static COLLECTIONS: [Collection; 4] = [PROYECTOS, TIPOS_TRABAJO, ESTADISTICAS, KNOWLEDGE];

/// Look up a collection by its route name
pub fn find(name: &str) -> Option<&'static Collection> {
    COLLECTIONS.iter().find(|c| c.name == name)
}
