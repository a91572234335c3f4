/// User-facing text for one language
#[derive(Debug, PartialEq, Eq)]
pub struct Strings {
    pub title: &'static str,
    pub url_label: &'static str,
    pub format_label: &'static str,
    pub download_button: &'static str,
    pub footer: &'static str,
    pub success: &'static str,
    pub error: &'static str,
    pub choose_folder: &'static str,
    pub downloading: &'static str,
}

/// Languages with a translation table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Language {
    Es,
    #[default]
    En,
    De,
    Fr,
    Pt,
    It,
    Gl,
    Ru,
    Hu,
}

const FOOTER: &str = "© Charlie Martínez - Quirinux GPLv2";

impl Language {
    /// Two-letter code, e.g. `"es"`
    pub fn from_code(code: &str) -> Option<Self> {
        let lang = match code.to_ascii_lowercase().as_str() {
            "es" => Language::Es,
            "en" => Language::En,
            "de" => Language::De,
            "fr" => Language::Fr,
            "pt" => Language::Pt,
            "it" => Language::It,
            "gl" => Language::Gl,
            "ru" => Language::Ru,
            "hu" => Language::Hu,
            _ => return None,
        };
        Some(lang)
    }

    /// POSIX locale such as `es_ES.UTF-8` or `pt-BR`; unsupported → English
    pub fn from_locale(locale: &str) -> Self {
        let code = locale
            .split(|c| c == '_' || c == '-' || c == '.' || c == '@')
            .next()
            .unwrap_or_default();
        Self::from_code(code).unwrap_or_default()
    }

    /// Picks the language from `LC_ALL`, `LC_MESSAGES` or `LANG`, in that order.
    pub fn detect() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .map(|value| Self::from_locale(&value))
            .unwrap_or_default()
    }

    pub fn strings(self) -> &'static Strings {
        match self {
            Language::Es => &ES,
            Language::En => &EN,
            Language::De => &DE,
            Language::Fr => &FR,
            Language::Pt => &PT,
            Language::It => &IT,
            Language::Gl => &GL,
            Language::Ru => &RU,
            Language::Hu => &HU,
        }
    }
}

static ES: Strings = Strings {
    title: "YouDown!",
    url_label: "Dirección de YouTube:",
    format_label: "Formato:",
    download_button: "Descargar",
    footer: FOOTER,
    success: "¡Descarga completa!",
    error: "Error al descargar:",
    choose_folder: "Selecciona carpeta de destino",
    downloading: "Descargando...",
};

static EN: Strings = Strings {
    title: "YouDown!",
    url_label: "YouTube URL:",
    format_label: "Format:",
    download_button: "Download",
    footer: FOOTER,
    success: "Download completed!",
    error: "Download failed:",
    choose_folder: "Select destination folder",
    downloading: "Downloading...",
};

static DE: Strings = Strings {
    title: "YouDown!",
    url_label: "YouTube-Adresse:",
    format_label: "Format:",
    download_button: "Herunterladen",
    footer: FOOTER,
    success: "Download abgeschlossen!",
    error: "Fehler beim Herunterladen:",
    choose_folder: "Zielordner auswählen",
    downloading: "Herunterladen...",
};

static FR: Strings = Strings {
    title: "YouDown!",
    url_label: "Adresse YouTube :",
    format_label: "Format :",
    download_button: "Télécharger",
    footer: FOOTER,
    success: "Téléchargement terminé !",
    error: "Erreur lors du téléchargement :",
    choose_folder: "Sélectionner le dossier de destination",
    downloading: "Téléchargement...",
};

static PT: Strings = Strings {
    title: "YouDown!",
    url_label: "Endereço do YouTube:",
    format_label: "Formato:",
    download_button: "Baixar",
    footer: FOOTER,
    success: "Download concluído!",
    error: "Erro ao baixar:",
    choose_folder: "Escolher pasta de destino",
    downloading: "Baixando...",
};

static IT: Strings = Strings {
    title: "YouDown!",
    url_label: "Indirizzo YouTube:",
    format_label: "Formato:",
    download_button: "Scarica",
    footer: FOOTER,
    success: "Download completato!",
    error: "Errore durante il download:",
    choose_folder: "Seleziona cartella di destinazione",
    downloading: "Scaricando...",
};

static GL: Strings = Strings {
    title: "YouDown!",
    url_label: "Enderezo de YouTube:",
    format_label: "Formato:",
    download_button: "Descargar",
    footer: FOOTER,
    success: "Descarga completa!",
    error: "Erro ao descargar:",
    choose_folder: "Selecciona o cartafol de destino",
    downloading: "Descargando...",
};

static RU: Strings = Strings {
    title: "YouDown!",
    url_label: "Ссылка на YouTube:",
    format_label: "Формат:",
    download_button: "Скачать",
    footer: FOOTER,
    success: "Загрузка завершена!",
    error: "Ошибка при загрузке:",
    choose_folder: "Выберите папку для сохранения",
    downloading: "Загрузка...",
};

static HU: Strings = Strings {
    title: "YouDown!",
    url_label: "YouTube URL:",
    format_label: "Formátum:",
    download_button: "Letöltés",
    footer: FOOTER,
    success: "Letöltés kész!",
    error: "Hiba a letöltéskor:",
    choose_folder: "Célmappa kiválasztása",
    downloading: "Letöltés...",
};
