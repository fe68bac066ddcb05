//! Response messages shown to API clients.

pub const NAME_REQUIRED: &str = "El nombre es obligatorio.";
pub const NAME_STRING: &str = "El nombre debe ser una cadena de texto.";
pub const NAME_MIN: &str = "El nombre debe tener al menos 2 caracteres.";
pub const NAME_MAX: &str = "El nombre no puede exceder 255 caracteres.";
pub const NAME_REGEX: &str = "El nombre solo puede contener letras y espacios.";

pub const EMAIL_REQUIRED: &str = "El correo electrónico es obligatorio.";
pub const EMAIL_STRING: &str = "El correo electrónico debe ser una cadena de texto.";
pub const EMAIL_EMAIL: &str = "El correo electrónico debe tener un formato válido.";
pub const EMAIL_MAX: &str = "El correo electrónico no puede exceder 255 caracteres.";
pub const EMAIL_UNIQUE: &str = "Este correo electrónico ya está registrado.";
pub const EMAIL_LOWERCASE: &str = "El correo electrónico debe estar en minúsculas.";

pub const PASSWORD_REQUIRED: &str = "La contraseña es obligatoria.";
pub const PASSWORD_STRING: &str = "La contraseña debe ser una cadena de texto.";
pub const PASSWORD_MIN: &str = "La contraseña debe tener al menos 8 caracteres.";
pub const PASSWORD_MAX: &str = "La contraseña no puede exceder 255 caracteres.";
pub const PASSWORD_REGEX: &str =
    "La contraseña debe contener al menos una letra minúscula, una mayúscula y un número.";

pub const ID_INTEGER: &str = "El identificador debe ser un número entero.";
pub const ID_MIN: &str = "El identificador debe ser mayor que cero.";

pub const PAGE_INTEGER: &str = "La página debe ser un número entero.";
pub const PAGE_MIN: &str = "La página debe ser al menos 1.";
pub const PER_PAGE_INTEGER: &str = "La cantidad por página debe ser un número entero.";
pub const PER_PAGE_MIN: &str = "La cantidad por página debe ser al menos 1.";
pub const PER_PAGE_MAX: &str = "La cantidad por página no puede exceder 100.";

pub const USER_CREATED: &str = "Usuario creado exitosamente";
pub const USER_UPDATED: &str = "Usuario actualizado exitosamente";
pub const USER_DELETED: &str = "Usuario eliminado exitosamente";

pub const USER_NOT_FOUND: &str = "Usuario no encontrado.";
pub const INTERNAL_ERROR: &str = "Error interno del servidor.";
