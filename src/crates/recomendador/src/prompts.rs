//! Fixed prompts and user-facing strings.
//!
//! Every canned message the agent can emit lives here, next to the prompt
//! templates for preference extraction and per-book explanations. The
//! assistant speaks Spanish; prompt templates instruct the model in Spanish
//! as well.

use crate::state::BookRecord;
use serde_json::Value;

/// Apology emitted when the model call itself fails mid-turn.
pub const MODEL_FAILURE_APOLOGY: &str =
    "Lo siento, tuve un problema al procesar tu solicitud. Por favor, inténtalo de nuevo.";

/// Clarifying question when no preferred genres are known yet.
pub const ASK_GENRES: &str = "¿Qué géneros de libros te gustan más?";

/// Clarifying question when genres are known but no authors are.
pub const ASK_AUTHORS: &str = "¿Tienes algún autor preferido?";

/// Open-ended refinement question once genres and authors are known.
pub const ASK_REFINEMENT: &str =
    "¿Hay algo más que te gustaría contarme sobre tus gustos literarios para afinar la búsqueda?";

/// Emitted when recommendations were requested without any known preferences.
pub const MISSING_PREFERENCES_MESSAGE: &str =
    "Necesito entender mejor tus gustos antes de recomendar. ¿Qué tipo de libros prefieres?";

/// Emitted when no usable search results were available.
pub const NO_RESULTS_MESSAGE: &str = "No encontré resultados de búsqueda relevantes para generar \
     recomendaciones. ¿Podrías intentar buscar con otros términos o refinar tus preferencias?";

/// Per-book fallback when an explanation call fails.
pub const EXPLANATION_FALLBACK: &str =
    "No se pudo generar una explicación detallada en este momento.";

/// Fallback explanation for a book no explanation was generated for.
pub const DEFAULT_EXPLANATION: &str = "Una opción interesante basada en tu búsqueda.";

/// Generic apology when there is nothing to format and no tagged message.
pub const GENERIC_APOLOGY: &str = "Lo siento, no pude generar recomendaciones en este momento.";

/// Intro line of the formatted recommendation list.
pub const RECOMMENDATIONS_INTRO: &str = "Aquí tienes algunas recomendaciones que podrían gustarte:\n";

/// Closing prompt after the recommendation list.
pub const RECOMMENDATIONS_CLOSING: &str = "\n\n¿Te gustaría obtener más detalles sobre alguno de \
     estos libros, buscar algo diferente o refinar las preferencias?";

/// Prompt asking the model to extract preference updates from a user reply.
///
/// The model must answer with a bare JSON object; fenced output is tolerated
/// and stripped by [`strip_json_fences`].
pub fn extraction_prompt(current_preferences: &Value, user_text: &str) -> String {
    format!(
        r#"
Analiza la siguiente respuesta del usuario y extrae sus preferencias de lectura (géneros, autores, libros mencionados, etc.).
Preferencias actuales conocidas: {current_preferences}
Respuesta del usuario: "{user_text}"
Devuelve SOLAMENTE un diccionario JSON actualizado con las preferencias encontradas. Si encuentras nuevas preferencias, añádelas o actualiza las existentes. Si no se mencionan preferencias claras, devuelve el diccionario actual o uno vacío si no había nada antes. NO incluyas explicaciones, solo el JSON.
Ejemplo de formato de salida: {{"preferred_genres": ["Ciencia Ficción", "Fantasía"], "liked_authors": ["Brandon Sanderson"]}}
Formato de salida estricto: {{...}}
"#
    )
}

/// Prompt asking the model for a 1-2 sentence justification of one book.
pub fn explanation_prompt(preferences: &Value, book: &BookRecord) -> String {
    let prefs_str = if preferences
        .as_object()
        .map(|o| o.is_empty())
        .unwrap_or(true)
    {
        "ninguna preferencia específica mencionada".to_string()
    } else {
        preferences.to_string()
    };

    let rating = book
        .average_rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let book_info = format!(
        "Título: {}, Autor: {}, Género: {}, Rating: {}",
        book.title,
        book.author,
        book.genre.as_deref().unwrap_or("N/A"),
        rating
    );

    format!(
        r#"
Dado que un usuario tiene estas preferencias: {prefs_str}.
Explica brevemente (1-2 frases) por qué el siguiente libro podría gustarle.
Libro: {book_info}.
Enfócate en conectar el libro con las preferencias si es posible. Si no hay conexión clara, da una razón general basada en el libro mismo. Sé conciso y directo.
"#
    )
}

/// Strip an optional ```json fence from model output.
pub fn strip_json_fences(content: &str) -> &str {
    let mut text = content.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences() {
        assert_eq!(strip_json_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_json_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_json_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_json_fences("  {} "), "{}");
    }

    #[test]
    fn test_extraction_prompt_embeds_context() {
        let prefs = json!({"preferred_genres": ["Fantasía"]});
        let prompt = extraction_prompt(&prefs, "me gusta Sanderson");

        assert!(prompt.contains("Fantasía"));
        assert!(prompt.contains("me gusta Sanderson"));
        assert!(prompt.contains("SOLAMENTE"));
    }

    #[test]
    fn test_explanation_prompt_without_preferences() {
        let book = BookRecord {
            id: 1,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: Some("Ciencia Ficción".to_string()),
            average_rating: Some(4.5),
        };
        let prompt = explanation_prompt(&json!({}), &book);

        assert!(prompt.contains("ninguna preferencia específica mencionada"));
        assert!(prompt.contains("Dune"));
        assert!(prompt.contains("4.5"));
    }
}
