//! Loading generation configuration (prompt overrides) from TOML.
//!
//! See `TestgenConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TestgenConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompts used when asking the model for test questions. Defaults match the
/// portal's production wording (Russian-language lectures). Override them in
/// TOML if you need to tune tone/structure.
///
/// The user template supports `{count}` and `{lecture_text}` placeholders.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub generation_system: String,
  pub generation_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      generation_system:
        "Ты составляешь тесты по тексту лекции. Отвечай ТОЛЬКО строго корректным JSON без пояснений."
          .into(),
      generation_user_template: "\
Составь {count} вопросов multiple-choice (4 варианта) по следующему тексту лекции.\n\
Верни ТОЛЬКО строго корректный JSON — массив объектов. Пример:\n\
[\n\
 {\"question\": \"Вопрос ...\", \"options\": [\"A\",\"B\",\"C\",\"D\"], \"correct_answer\": \"текст правильного варианта\", \"explanation\": \"кратко почему\"}\n\
]\n\
Каждый объект: question (строка), options (массив 4 строк), correct_answer (строка — совпадает с одним из options), explanation (строка).\n\
Правильный ответ НЕ должен систематически стоять первым в options.\n\
Текст лекции:\n\
{lecture_text}\n"
        .into(),
    }
  }
}

/// Attempt to load `TestgenConfig` from TESTGEN_CONFIG_PATH. On any parsing/IO
/// error, returns None and the built-in prompts are used.
pub fn load_testgen_config_from_env() -> Option<TestgenConfig> {
  let path = std::env::var("TESTGEN_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<TestgenConfig>(&s) {
      Ok(cfg) => {
        info!(target: "lektor_backend", %path, "Loaded testgen config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "lektor_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "lektor_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::fill_template;

  #[test]
  fn default_user_template_carries_count_and_lecture() {
    let p = Prompts::default();
    let user = fill_template(
      &p.generation_user_template,
      &[("count", "7"), ("lecture_text", "Фотосинтез — это ...")],
    );
    assert!(user.contains("Составь 7 вопросов"));
    assert!(user.contains("Фотосинтез"));
    assert!(!user.contains("{count}"));
    assert!(!user.contains("{lecture_text}"));
  }
}
