//! Localized strings for generated descriptions and summaries.

use indexmap::IndexMap;

/// Supported description locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Parse a locale code such as `en`, `ru` or `ru_RU`; unknown codes fall back to English
    pub fn from_code(code: &str) -> Self {
        let language = code
            .split(|c: char| c == '_' || c == '-')
            .next()
            .unwrap_or(code)
            .to_lowercase();
        match language.as_str() {
            "ru" => Locale::Ru,
            _ => Locale::En,
        }
    }
}

/// Message catalogue for one locale, with optional status-text overrides
#[derive(Debug, Clone, Default)]
pub struct Messages {
    locale: Locale,
    status_overrides: IndexMap<u16, String>,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            status_overrides: IndexMap::new(),
        }
    }

    pub fn for_code(code: &str) -> Self {
        Self::new(Locale::from_code(code))
    }

    /// Replace the built-in description of some status codes
    pub fn with_status_overrides(mut self, overrides: IndexMap<u16, String>) -> Self {
        self.status_overrides = overrides;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Default description of a path parameter
    pub fn id_of(&self, name: &str) -> String {
        match self.locale {
            Locale::En => format!("ID of {}", name),
            Locale::Ru => format!("ID {}", name),
        }
    }

    pub fn max(&self, value: &str) -> String {
        match self.locale {
            Locale::En => format!("max {}", value),
            Locale::Ru => format!("макс. {}", value),
        }
    }

    pub fn min(&self, value: &str) -> String {
        match self.locale {
            Locale::En => format!("min {}", value),
            Locale::Ru => format!("мин. {}", value),
        }
    }

    pub fn unique(&self) -> &'static str {
        match self.locale {
            Locale::En => "must be unique",
            Locale::Ru => "должно быть уникальным",
        }
    }

    pub fn exists(&self) -> &'static str {
        match self.locale {
            Locale::En => "must reference an existing record",
            Locale::Ru => "должно ссылаться на существующую запись",
        }
    }

    /// Generated operation summary for a method and a headline-cased resource
    pub fn summary(&self, method: &str, resource: &str, is_collection: bool) -> String {
        let verb = match (self.locale, method, is_collection) {
            (Locale::En, "get", true) => "List",
            (Locale::En, "get", false) => "Get",
            (Locale::En, "post", _) => "Create",
            (Locale::En, "put" | "patch", _) => "Update",
            (Locale::En, "delete", _) => "Delete",
            (Locale::Ru, "get", true) => "Список",
            (Locale::Ru, "get", false) => "Получить",
            (Locale::Ru, "post", _) => "Создать",
            (Locale::Ru, "put" | "patch", _) => "Обновить",
            (Locale::Ru, "delete", _) => "Удалить",
            _ => return format!("{} {}", crate::inflector::headline(method), resource),
        };
        format!("{} {}", verb, resource)
    }

    /// Description of one of the reusable component responses
    pub fn component_response(&self, name: &str) -> &'static str {
        match (self.locale, name) {
            (Locale::En, "Success") => "Successful response",
            (Locale::En, "Created") => "Resource created",
            (Locale::En, "BadRequest") => "Bad request",
            (Locale::En, "Unauthorized") => "Unauthorized",
            (Locale::En, "NotFound") => "Resource not found",
            (Locale::En, "ValidationError") => "Validation error",
            (Locale::En, "NoContent") => "Resource deleted",
            (Locale::Ru, "Success") => "Успешный ответ",
            (Locale::Ru, "Created") => "Ресурс создан",
            (Locale::Ru, "BadRequest") => "Некорректный запрос",
            (Locale::Ru, "Unauthorized") => "Не авторизован",
            (Locale::Ru, "NotFound") => "Ресурс не найден",
            (Locale::Ru, "ValidationError") => "Ошибка валидации",
            (Locale::Ru, "NoContent") => "Ресурс удален",
            (Locale::Ru, _) => "Ответ",
            (Locale::En, _) => "Response",
        }
    }

    /// Description of an explicit response with the given status code
    pub fn status(&self, status: u16) -> String {
        if let Some(text) = self.status_overrides.get(&status) {
            return text.clone();
        }

        let text = match (self.locale, status) {
            (Locale::En, 200) => "Success",
            (Locale::En, 201) => "Created",
            (Locale::En, 204) => "No Content",
            (Locale::En, 400) => "Bad Request",
            (Locale::En, 401) => "Unauthorized",
            (Locale::En, 403) => "Forbidden",
            (Locale::En, 404) => "Not Found",
            (Locale::En, 422) => "Validation Error",
            (Locale::En, 500) => "Server Error",
            (Locale::Ru, 200) => "Успешно",
            (Locale::Ru, 201) => "Создано",
            (Locale::Ru, 204) => "Нет содержимого",
            (Locale::Ru, 400) => "Некорректный запрос",
            (Locale::Ru, 401) => "Не авторизован",
            (Locale::Ru, 403) => "Доступ запрещен",
            (Locale::Ru, 404) => "Не найдено",
            (Locale::Ru, 422) => "Ошибка валидации",
            (Locale::Ru, 500) => "Ошибка сервера",
            _ => return format!("HTTP {}", status),
        };
        text.to_string()
    }
}
