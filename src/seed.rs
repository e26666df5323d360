use crate::models::{Article, Category};

struct SeedArticle {
    id: &'static str,
    title: &'static str,
    excerpt: &'static str,
    content: &'static str,
    author: &'static str,
    date: &'static str,
    category: Category,
    image_seed: &'static str,
    read_time: &'static str,
}

const SEED: [SeedArticle; 3] = [
    SeedArticle {
        id: "1",
        title: "The Future of Web Development in 2025",
        excerpt: "Exploring how AI and edge computing are reshaping the digital landscape as we know it.",
        content: "The web is evolving faster than ever. From serverless architectures to the rise of specialized AI models integrated directly into front-end frameworks, the tools at our disposal are becoming incredibly powerful. We are moving toward a world where the distinction between client and server is blurred, and performance is measured in microseconds at the edge.",
        author: "Elena Vance",
        date: "Oct 24, 2024",
        category: Category::Technology,
        image_seed: "tech",
        read_time: "6 min read",
    },
    SeedArticle {
        id: "2",
        title: "Minimalism: A Path to Mental Clarity",
        excerpt: "How reducing our physical and digital clutter can lead to a more focused and fulfilling creative life.",
        content: "Minimalism is not just about having fewer things; it is about making room for what truly matters. In an age of information overload, the ability to selectively ignore is a superpower. By decluttering our workspaces and our minds, we unlock new levels of creativity and peace.",
        author: "Julian Moore",
        date: "Oct 22, 2024",
        category: Category::Lifestyle,
        image_seed: "minimal",
        read_time: "4 min read",
    },
    SeedArticle {
        id: "3",
        title: "Designing with Empathy",
        excerpt: "Why user-centric design starts with understanding human emotions and accessibility needs.",
        content: "Good design is invisible. It works so well that the user doesnt even notice it. But reaching that level of simplicity requires deep empathy. We must understand not just what the user wants to do, but how they feel when they are doing it.",
        author: "Sarah Chen",
        date: "Oct 20, 2024",
        category: Category::Design,
        image_seed: "design",
        read_time: "8 min read",
    },
];

/// Built-in articles used when nothing usable is stored yet.
pub fn seed_articles() -> Vec<Article> {
    SEED.iter()
        .map(|seed| Article {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            excerpt: seed.excerpt.to_string(),
            content: seed.content.to_string(),
            author: seed.author.to_string(),
            date: seed.date.to_string(),
            category: seed.category,
            image_url: format!("https://picsum.photos/seed/{}/800/450", seed.image_seed),
            read_time: seed.read_time.to_string(),
        })
        .collect()
}
