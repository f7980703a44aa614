//! Server-rendered HTML pages
//!
//! Every piece of user-provided text goes through [`text`] or [`attr`]
//! before reaching the page.

use std::collections::HashSet;
use std::fmt::Write;

use htmlescape::{encode_attribute, encode_minimal};

use crate::{
    forms::{EditProfileForm, FieldErrors, LoginForm, MessageForm, ProfileForm, SignupForm},
    models::{MessageWithAuthor, User, UserStats, UserSummary},
    session::Flash,
};

fn text(value: &str) -> String {
    encode_minimal(value)
}

fn attr(value: &str) -> String {
    encode_attribute(value)
}

/// What every page needs besides its body
pub struct PageContext<'a> {
    pub user: Option<&'a User>,
    pub flashes: Vec<Flash>,
}

impl<'a> PageContext<'a> {
    pub fn new(user: Option<&'a User>, flashes: Vec<Flash>) -> Self {
        Self { user, flashes }
    }
}

fn layout(ctx: &PageContext<'_>, title: &str, body: &str) -> String {
    let mut nav = String::new();
    match ctx.user {
        Some(user) => {
            let _ = write!(
                nav,
                r#"<li><a href="/users/{id}"><img src="{img}" alt="{name}" class="avatar">{name}</a></li>
<li><a href="/messages/new">New Message</a></li>
<li><a href="/users/profile">Profile</a></li>
<li><form method="POST" action="/logout"><button>Log out</button></form></li>"#,
                id = user.id,
                img = attr(&user.image_url),
                name = text(&user.username),
            );
        }
        None => {
            nav.push_str(
                r#"<li><a href="/signup">Sign up</a></li>
<li><a href="/login">Log in</a></li>"#,
            );
        }
    }

    let mut flashes = String::new();
    for flash in &ctx.flashes {
        let _ = write!(
            flashes,
            r#"<div class="alert alert-{}">{}</div>"#,
            flash.category.as_str(),
            text(&flash.message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Warbler</title>
</head>
<body>
<nav>
<a href="/" class="brand">Warbler</a>
<form action="/users" method="GET"><input name="q" placeholder="Search Warbler"><button>Search</button></form>
<ul>
{nav}
</ul>
</nav>
<main>
{flashes}
{body}
</main>
</body>
</html>"#,
        title = text(title),
    )
}

fn field_error(errors: &FieldErrors, field: &str) -> String {
    errors
        .get(field)
        .map(|message| format!(r#"<span class="error">{}</span>"#, text(message)))
        .unwrap_or_default()
}

fn input(kind: &str, name: &str, label: &str, value: &str, errors: &FieldErrors) -> String {
    format!(
        r#"<p><label for="{name}">{label}</label>
<input type="{kind}" id="{name}" name="{name}" value="{value}">{error}</p>"#,
        value = attr(value),
        label = text(label),
        error = field_error(errors, name),
    )
}

fn textarea(name: &str, label: &str, value: &str, errors: &FieldErrors) -> String {
    format!(
        r#"<p><label for="{name}">{label}</label>
<textarea id="{name}" name="{name}">{value}</textarea>{error}</p>"#,
        value = text(value),
        label = text(label),
        error = field_error(errors, name),
    )
}

fn message_item(message: &MessageWithAuthor, viewer: Option<&User>, liked: bool) -> String {
    let mut actions = String::new();
    if let Some(viewer) = viewer {
        if viewer.id == message.user_id {
            let _ = write!(
                actions,
                r#"<form method="POST" action="/messages/{}/delete"><button class="delete">Delete</button></form>"#,
                message.id
            );
        } else if liked {
            let _ = write!(
                actions,
                r#"<form method="POST" action="/messages/{}/unlike"><button class="liked">Unlike</button></form>"#,
                message.id
            );
        } else {
            let _ = write!(
                actions,
                r#"<form method="POST" action="/messages/{}/like"><button class="like">Like</button></form>"#,
                message.id
            );
        }
    }

    format!(
        r#"<li class="message">
<a href="/users/{user_id}"><img src="{img}" alt="{name}" class="avatar"></a>
<a href="/users/{user_id}">@{name}</a>
<span class="timestamp">{ts}</span>
<p><a href="/messages/{id}">{body}</a></p>
{actions}
</li>"#,
        id = message.id,
        user_id = message.user_id,
        img = attr(&message.image_url),
        name = text(&message.username),
        ts = message.timestamp.format("%d %B %Y"),
        body = text(&message.text),
    )
}

fn message_list(
    messages: &[MessageWithAuthor],
    viewer: Option<&User>,
    liked: &HashSet<i32>,
) -> String {
    if messages.is_empty() {
        return r#"<p class="empty">No messages yet.</p>"#.to_string();
    }

    let items: String = messages
        .iter()
        .map(|m| message_item(m, viewer, liked.contains(&m.id)))
        .collect();
    format!(r#"<ul class="messages">{}</ul>"#, items)
}

fn user_card(user: &UserSummary) -> String {
    format!(
        r#"<li class="user-card">
<a href="/users/{id}"><img src="{img}" alt="{name}" class="avatar">@{name}</a>
<p>{bio}</p>
</li>"#,
        id = user.id,
        img = attr(&user.image_url),
        name = text(&user.username),
        bio = text(user.bio.as_deref().unwrap_or("")),
    )
}

fn user_cards(users: &[UserSummary]) -> String {
    if users.is_empty() {
        return r#"<p class="empty">Sorry, no users found.</p>"#.to_string();
    }

    let cards: String = users.iter().map(user_card).collect();
    format!(r#"<ul class="users">{}</ul>"#, cards)
}

/// Landing page for anonymous visitors
pub fn home_anon(ctx: &PageContext<'_>) -> String {
    layout(
        ctx,
        "Home",
        r#"<section class="home-hero">
<h1>What's Happening?</h1>
<h4>New to Warbler?</h4>
<a href="/signup" class="btn">Sign up now</a>
</section>"#,
    )
}

/// Home feed of a logged-in user
pub fn home(
    ctx: &PageContext<'_>,
    user: &User,
    stats: &UserStats,
    messages: &[MessageWithAuthor],
    liked: &HashSet<i32>,
) -> String {
    let body = format!(
        r#"<aside class="profile-summary">
<a href="/users/{id}"><img src="{img}" alt="{name}" class="avatar">@{name}</a>
<ul class="stats">
<li><a href="/users/{id}">Messages {messages_count}</a></li>
<li><a href="/users/{id}/following">Following {following}</a></li>
<li><a href="/users/{id}/followers">Followers {followers}</a></li>
</ul>
</aside>
{feed}"#,
        id = user.id,
        img = attr(&user.image_url),
        name = text(&user.username),
        messages_count = stats.messages,
        following = stats.following,
        followers = stats.followers,
        feed = message_list(messages, Some(user), liked),
    );
    layout(ctx, "Home", &body)
}

/// Signup form
pub fn signup(ctx: &PageContext<'_>, form: &SignupForm, errors: &FieldErrors) -> String {
    let body = format!(
        r#"<h2>Join Warbler today.</h2>
<form method="POST" action="/signup">
{username}{email}{password}{image_url}
<button>Sign me up!</button>
</form>"#,
        username = input("text", "username", "Username", &form.username, errors),
        email = input("email", "email", "E-mail", &form.email, errors),
        password = input("password", "password", "Password", "", errors),
        image_url = input("text", "image_url", "(Optional) Image URL", &form.image_url, errors),
    );
    layout(ctx, "Sign up", &body)
}

/// Login form
pub fn login(ctx: &PageContext<'_>, form: &LoginForm, errors: &FieldErrors) -> String {
    let body = format!(
        r#"<h2>Welcome back.</h2>
<form method="POST" action="/login">
{username}{password}
<button>Log in</button>
</form>"#,
        username = input("text", "username", "Username", &form.username, errors),
        password = input("password", "password", "Password", "", errors),
    );
    layout(ctx, "Log in", &body)
}

/// User directory, optionally filtered
pub fn users_index(ctx: &PageContext<'_>, users: &[UserSummary], search: Option<&str>) -> String {
    let heading = match search {
        Some(term) if !term.trim().is_empty() => {
            format!("<h2>Users matching &ldquo;{}&rdquo;</h2>", text(term))
        }
        _ => "<h2>Users</h2>".to_string(),
    };
    layout(ctx, "Users", &format!("{}{}", heading, user_cards(users)))
}

fn profile_header(
    user: &User,
    stats: &UserStats,
    viewer: Option<&User>,
    is_following: bool,
) -> String {
    let action = match viewer {
        Some(viewer) if viewer.id == user.id => {
            r#"<a href="/users/edit" class="btn">Edit Profile</a>
<form method="POST" action="/users/delete"><button class="delete">Delete Profile</button></form>"#
                .to_string()
        }
        Some(_) if is_following => format!(
            r#"<form method="POST" action="/users/stop-following/{}"><button>Unfollow</button></form>"#,
            user.id
        ),
        Some(_) => format!(
            r#"<form method="POST" action="/users/follow/{}"><button>Follow</button></form>"#,
            user.id
        ),
        None => String::new(),
    };

    format!(
        r#"<header class="profile" style="background-image: url('{header}')">
<img src="{img}" alt="{name}" class="avatar-large">
<h2>@{name}</h2>
<p class="bio">{bio}</p>
<p class="location">{location}</p>
<ul class="stats">
<li><a href="/users/{id}">Messages {messages}</a></li>
<li><a href="/users/{id}/following">Following {following}</a></li>
<li><a href="/users/{id}/followers">Followers {followers}</a></li>
<li>Likes {likes}</li>
</ul>
{action}
</header>"#,
        id = user.id,
        header = attr(&user.header_image_url),
        img = attr(&user.image_url),
        name = text(&user.username),
        bio = text(user.bio.as_deref().unwrap_or("")),
        location = text(user.location.as_deref().unwrap_or("")),
        messages = stats.messages,
        following = stats.following,
        followers = stats.followers,
        likes = stats.likes,
    )
}

/// Public profile with the user's newest messages
pub fn user_show(
    ctx: &PageContext<'_>,
    user: &User,
    stats: &UserStats,
    messages: &[MessageWithAuthor],
    is_following: bool,
    liked: &HashSet<i32>,
) -> String {
    let body = format!(
        "{}{}",
        profile_header(user, stats, ctx.user, is_following),
        message_list(messages, ctx.user, liked)
    );
    layout(ctx, &user.username, &body)
}

/// Following / followers listing for a user
pub fn user_connections(
    ctx: &PageContext<'_>,
    heading: &str,
    user: &User,
    users: &[UserSummary],
) -> String {
    let body = format!(
        r#"<h2><a href="/users/{id}">@{name}</a> &middot; {heading}</h2>{cards}"#,
        id = user.id,
        name = text(&user.username),
        heading = text(heading),
        cards = user_cards(users),
    );
    layout(ctx, heading, &body)
}

/// Own profile with the location / bio / header form
pub fn profile(
    ctx: &PageContext<'_>,
    user: &User,
    stats: &UserStats,
    form: &ProfileForm,
    errors: &FieldErrors,
) -> String {
    let body = format!(
        r#"{header}
<h3>Profile details</h3>
<form method="POST" action="/users/profile">
{location}{bio}{header_image}
<button>Save</button>
</form>"#,
        header = profile_header(user, stats, ctx.user, false),
        location = input("text", "location", "Location", &form.location, errors),
        bio = textarea("bio", "Bio", &form.bio, errors),
        header_image = input(
            "text",
            "header_image_url",
            "Header Image URL",
            &form.header_image_url,
            errors
        ),
    );
    layout(ctx, "Profile", &body)
}

/// Account edit form
pub fn edit_user(ctx: &PageContext<'_>, form: &EditProfileForm, errors: &FieldErrors) -> String {
    let body = format!(
        r#"<h2>Edit Your Profile.</h2>
<form method="POST" action="/users/edit">
{username}{email}{image_url}{header_image_url}{bio}
<p>To confirm changes, enter your password:</p>
{password}
<button>Edit this user!</button>
</form>
<a href="/users/profile">Cancel</a>"#,
        username = input("text", "username", "Username", &form.username, errors),
        email = input("email", "email", "E-mail", &form.email, errors),
        image_url = input("text", "image_url", "Image URL", &form.image_url, errors),
        header_image_url = input(
            "text",
            "header_image_url",
            "Header Image URL",
            &form.header_image_url,
            errors
        ),
        bio = textarea("bio", "Bio", &form.bio, errors),
        password = input("password", "password", "Password", "", errors),
    );
    layout(ctx, "Edit Profile", &body)
}

/// New message form
pub fn new_message(ctx: &PageContext<'_>, form: &MessageForm, errors: &FieldErrors) -> String {
    let body = format!(
        r#"<h2>What's happening?</h2>
<form method="POST" action="/messages/new">
{text}
<button>Add my message!</button>
</form>"#,
        text = textarea("text", "Message", &form.text, errors),
    );
    layout(ctx, "New Message", &body)
}

/// Single message page
pub fn message_show(ctx: &PageContext<'_>, message: &MessageWithAuthor, liked: bool) -> String {
    let body = format!(
        r#"<ul class="messages">{}</ul>"#,
        message_item(message, ctx.user, liked)
    );
    layout(ctx, "Message", &body)
}

/// 404 page
pub fn not_found() -> String {
    layout(
        &PageContext::new(None, Vec::new()),
        "Not Found",
        r#"<h1>404</h1><p>Sorry, we couldn't find that page.</p><a href="/">Go home</a>"#,
    )
}

/// 500 page
pub fn server_error() -> String {
    layout(
        &PageContext::new(None, Vec::new()),
        "Error",
        r#"<h1>Something went wrong</h1><p>Please try again later.</p><a href="/">Go home</a>"#,
    )
}
