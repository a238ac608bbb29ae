//! Static theme catalog.

use serde::Serialize;

/// A named, fixed set of candidate words
#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub words: &'static [&'static str],
}

pub const THEMES: &[Theme] = &[
    Theme {
        id: "animals",
        name: "🐾 Animales",
        words: &[
            "León", "Tigre", "Elefante", "Jirafa", "Cebra", "Mono", "Pingüino", "Delfín",
            "Águila", "Serpiente",
        ],
    },
    Theme {
        id: "food",
        name: "🍕 Comida",
        words: &[
            "Pizza", "Hamburguesa", "Sushi", "Pasta", "Ensalada", "Helado", "Chocolate",
            "Manzana", "Naranja", "Plátano",
        ],
    },
    Theme {
        id: "colors",
        name: "🎨 Colores",
        words: &[
            "Rojo", "Azul", "Verde", "Amarillo", "Morado", "Naranja", "Rosa", "Negro", "Blanco",
            "Gris",
        ],
    },
    Theme {
        id: "jobs",
        name: "💼 Profesiones",
        words: &[
            "Doctor", "Profesor", "Ingeniero", "Artista", "Chef", "Policía", "Bombero", "Piloto",
            "Veterinario", "Músico",
        ],
    },
    Theme {
        id: "sports",
        name: "⚽ Deportes",
        words: &[
            "Fútbol", "Baloncesto", "Tenis", "Natación", "Atletismo", "Boxeo", "Golf",
            "Voleibol", "Hockey", "Rugby",
        ],
    },
    Theme {
        id: "countries",
        name: "🌍 Países",
        words: &[
            "México", "España", "Francia", "Japón", "Brasil", "Canadá", "Australia", "Italia",
            "Alemania", "China",
        ],
    },
];

/// Look up a theme by id
pub fn find_theme(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}
