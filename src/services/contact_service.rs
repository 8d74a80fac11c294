use serde::Deserialize;
use sqlx::AnyPool;
use std::collections::HashMap;
use tracing::info;

use crate::database::manager::{inserted_id, DatabaseError};

/// Field name to message, reported back to the form
pub type FieldErrors = HashMap<String, String>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactMessage {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub email: String,
    pub telefono: Option<String>,
    pub asunto: Option<String>,
    #[serde(default)]
    pub mensaje: String,
}

impl ContactMessage {
    /// `nombre`, `email` and `mensaje` must be present and non-blank
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, value) in [("nombre", &self.nombre), ("email", &self.email), ("mensaje", &self.mensaje)] {
            if value.trim().is_empty() {
                errors.insert(field.to_string(), "This field is required".to_string());
            }
        }
        if !self.email.trim().is_empty() && !self.email.contains('@') {
            errors.insert("email".to_string(), "Invalid email address".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub async fn store_message(pool: &AnyPool, message: &ContactMessage) -> Result<i64, DatabaseError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "INSERT INTO `mensajes_contacto` (`nombre`, `email`, `telefono`, `asunto`, `mensaje`) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(message.nombre.trim().to_string())
    .bind(message.email.trim().to_string())
    .bind(message.telefono.clone())
    .bind(message.asunto.clone())
    .bind(message.mensaje.clone())
    .execute(&mut *tx)
    .await?;
    let id = inserted_id(&mut tx, &result, "contact message").await?;
    tx.commit().await?;

    info!("contact message {} stored", id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::seeded_pool;

    #[test]
    fn reports_every_missing_field() {
        let errors = ContactMessage::default().validate().unwrap_err();
        let mut fields: Vec<_> = errors.keys().cloned().collect();
        fields.sort();
        assert_eq!(fields, vec!["email", "mensaje", "nombre"]);

        let bad_email = ContactMessage {
            nombre: "Ana".into(),
            email: "ana".into(),
            mensaje: "Hola".into(),
            ..Default::default()
        };
        assert!(bad_email.validate().unwrap_err().contains_key("email"));
    }

    #[tokio::test]
    async fn stores_messages() {
        let pool = seeded_pool().await;
        let message = ContactMessage {
            nombre: " Ana ".into(),
            email: "ana@example.com".into(),
            mensaje: "Necesito un presupuesto".into(),
            ..Default::default()
        };
        message.validate().unwrap();

        let first = store_message(&pool, &message).await.unwrap();
        let second = store_message(&pool, &message).await.unwrap();
        assert_eq!((first, second), (1, 2));
    }
}
